use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::{DatasetBundle, DatasetLoader, FileSource, aliases_from_json_str};
use clap::{Parser, Subcommand};
use engine::{EngineConfig, indicator_datasets};
use formats::CountryCollection;
use layers::{Indicator, ScaleMode, render_indicator};
use scene::{AliasTable, Iso3, IsoResolver, SearchIndex, World};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect the world map's geometry and datasets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the country code every feature resolves to
    Resolve {
        /// Country outlines (GeoJSON FeatureCollection)
        #[arg(long)]
        geojson: PathBuf,

        /// Alias table (`{ "name": "ISO" }`); repeatable, later files win
        #[arg(long)]
        aliases: Vec<PathBuf>,
    },

    /// Print bin edges and legend rows for one layer
    Legend {
        /// Root the `data/` locations resolve against
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// readiness, exposure, grid, compute, composite or composite:<metric>
        #[arg(long)]
        layer: Indicator,

        /// quantile or absolute (composite layers only)
        #[arg(long)]
        scale: Option<ScaleMode>,
    },

    /// Resolve a free-text query to a feature
    Search {
        #[arg(long)]
        geojson: PathBuf,

        /// Root the `data/` locations resolve against
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        query: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args.command).await {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Command) -> Result<String, String> {
    match command {
        Command::Resolve { geojson, aliases } => {
            let world = read_world(&geojson).await?;
            let mut tables = Vec::with_capacity(aliases.len());
            for path in &aliases {
                tables.push(read_aliases(path).await?);
            }
            let resolver = IsoResolver::with_aliases(AliasTable::merged(tables));
            Ok(resolution_report(&world, &resolver))
        }
        Command::Legend {
            data_dir,
            layer,
            scale,
        } => {
            let bundle = load_bundle(&data_dir).await;
            let config = EngineConfig::from_env();
            legend_report(&bundle, layer, scale.unwrap_or(config.default_scale_mode))
        }
        Command::Search {
            geojson,
            data_dir,
            query,
        } => {
            let (world, bundle) = tokio::join!(read_world(&geojson), load_bundle(&data_dir));
            let world = world?;
            Ok(search_report(&world, &bundle, &query))
        }
    }
}

async fn read_world(path: &Path) -> Result<World, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let collection =
        CountryCollection::from_geojson_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    if collection.skipped > 0 {
        tracing::info!(skipped = collection.skipped, "features without geometry dropped");
    }
    Ok(collection.into_world())
}

async fn read_aliases(path: &Path) -> Result<AliasTable, String> {
    let location = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("{location}: {e}"))?;
    aliases_from_json_str(&location, &text).map_err(|e| e.to_string())
}

async fn load_bundle(data_dir: &Path) -> DatasetBundle {
    let config = EngineConfig::from_env();
    DatasetLoader::new(Arc::new(FileSource::new(data_dir)))
        .with_timeout(config.load_timeout())
        .with_locations(config.locations.clone())
        .load_bundle()
        .await
}

fn resolver_for(bundle: &DatasetBundle) -> IsoResolver {
    IsoResolver::with_aliases(bundle.aliases.clone())
}

fn resolution_report(world: &World, resolver: &IsoResolver) -> String {
    let mut out = String::new();
    let mut unresolved = Vec::new();
    for (id, feature) in world.iter() {
        let iso3 = resolver.resolve(feature);
        let name = feature.display_name();
        let code = if iso3.is_resolved() { iso3.as_str() } else { "---" };
        let _ = writeln!(out, "{:>4}  {code}  {name}", id.0);
        if !iso3.is_resolved() {
            unresolved.push(name);
        }
    }
    if unresolved.is_empty() {
        let _ = writeln!(out, "all {} features resolved", world.len());
    } else {
        let _ = writeln!(out, "{} unresolved: {}", unresolved.len(), unresolved.join(", "));
    }
    out
}

fn legend_report(
    bundle: &DatasetBundle,
    indicator: Indicator,
    mode: ScaleMode,
) -> Result<String, String> {
    let datasets = indicator_datasets(bundle);
    let data = datasets
        .get(&indicator)
        .cloned()
        .ok_or_else(|| format!("no data for layer {indicator}"))?;
    let countries = data.len();
    let layer = render_indicator(indicator, data, mode);

    let mut out = String::new();
    let _ = writeln!(out, "{} ({}, {countries} countries)", layer.legend.title, layer.mode);
    let edges: Vec<String> = layer.edges.as_array().iter().map(|e| format!("{e}")).collect();
    let _ = writeln!(out, "edges: {}", edges.join(" "));
    for entry in layer.legend.entries.iter().chain([&layer.legend.no_data]) {
        let _ = writeln!(out, "  {}  {}", entry.color, entry.label);
    }
    Ok(out)
}

fn search_report(world: &World, bundle: &DatasetBundle, query: &str) -> String {
    let resolver = resolver_for(bundle);
    let endonyms: &HashMap<Iso3, String> = &bundle.endonyms;
    let index = SearchIndex::build(world, &resolver, endonyms);
    let hit = index
        .resolve(query)
        .and_then(|id| world.get(id).map(|feature| (id, feature)));
    match hit {
        Some((id, feature)) => format!(
            "{}  {}  {}\n",
            id.0,
            resolver.resolve(feature),
            feature.display_name()
        ),
        None => format!("no match for {query:?}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, legend_report, resolution_report, search_report};
    use catalog::{DatasetBundle, IndicatorDataset};
    use clap::Parser;
    use formats::CountryCollection;
    use layers::{CompositeMetric, Indicator, ScaleMode};
    use pretty_assertions::assert_eq;
    use scene::{AliasTable, Iso3, IsoResolver, World};

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "France", "ISO_A3": "FRA" },
              "geometry": { "type": "Polygon", "coordinates": [[[0,45],[5,45],[5,50],[0,45]]] } },
            { "type": "Feature", "properties": { "name": "Côte d'Ivoire" },
              "geometry": { "type": "Polygon", "coordinates": [[[-8,5],[-3,5],[-3,10],[-8,5]]] } },
            { "type": "Feature", "properties": { "name": "Atlantis" },
              "geometry": { "type": "Polygon", "coordinates": [[[-30,30],[-25,30],[-25,35],[-30,30]]] } }
        ]
    }"#;

    fn world() -> World {
        CountryCollection::from_geojson_str(WORLD)
            .expect("fixture parses")
            .into_world()
    }

    fn iso(code: &str) -> Iso3 {
        Iso3::parse(code).expect("valid code")
    }

    #[test]
    fn parses_repeated_alias_flags() {
        let args = Args::try_parse_from([
            "atlas", "resolve", "--geojson", "w.json", "--aliases", "a.json", "--aliases", "b.json",
        ])
        .expect("valid args");
        let Command::Resolve { aliases, .. } = args.command else {
            panic!("expected resolve");
        };
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn parses_layer_and_scale_names() {
        let args = Args::try_parse_from([
            "atlas", "legend", "--layer", "composite:government", "--scale", "quantile",
        ])
        .expect("valid args");
        let Command::Legend { layer, scale, .. } = args.command else {
            panic!("expected legend");
        };
        assert_eq!(layer, Indicator::Composite(CompositeMetric::Government));
        assert_eq!(scale, Some(ScaleMode::Quantile));
        assert!(Args::try_parse_from(["atlas", "legend", "--layer", "rainfall"]).is_err());
    }

    #[test]
    fn resolution_report_lists_unresolved_names() {
        let resolver = IsoResolver::new();
        let report = resolution_report(&world(), &resolver);
        assert!(report.contains("FRA  France"));
        assert!(report.contains("CIV  Côte d'Ivoire"));
        assert!(report.ends_with("1 unresolved: Atlantis\n"));
    }

    #[test]
    fn aliases_resolve_remaining_features() {
        let resolver =
            IsoResolver::with_aliases(AliasTable::from_pairs([("Atlantis", "ATL")]));
        let report = resolution_report(&world(), &resolver);
        assert!(report.ends_with("all 3 features resolved\n"));
    }

    #[test]
    fn legend_report_prints_five_classes_and_no_data() {
        let bundle = DatasetBundle {
            readiness: Some(IndicatorDataset::from_values([
                (iso("FRA"), 10.0),
                (iso("DEU"), 20.0),
                (iso("USA"), 30.0),
                (iso("CAN"), 40.0),
                (iso("MEX"), 50.0),
            ])),
            ..DatasetBundle::default()
        };
        let report = legend_report(&bundle, Indicator::Readiness, ScaleMode::Absolute)
            .expect("readiness present");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Readiness (0–100) (quantile, 5 countries)");
        assert_eq!(lines[1], "edges: 18 26 34 42");
        assert_eq!(lines.len(), 8);
        assert!(lines[7].ends_with("No data"));
    }

    #[test]
    fn legend_report_fails_without_data() {
        let err = legend_report(&DatasetBundle::default(), Indicator::Exposure, ScaleMode::Quantile)
            .expect_err("no exposure data");
        assert_eq!(err, "no data for layer exposure");
    }

    #[test]
    fn search_matches_aliases_and_reports_misses() {
        let bundle = DatasetBundle {
            aliases: AliasTable::from_pairs([("Ivory Coast", "CIV")]),
            ..DatasetBundle::default()
        };
        assert_eq!(search_report(&world(), &bundle, "ivory coast"), "1  CIV  Côte d'Ivoire\n");
        assert_eq!(search_report(&world(), &bundle, "Narnia"), "no match for \"Narnia\"\n");
    }
}
