use crate::feature::{CountryFeature, FeatureId};

/// Owns every loaded country feature for the lifetime of the map.
#[derive(Debug, Default, Clone)]
pub struct World {
    features: Vec<CountryFeature>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_features(features: Vec<CountryFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<&CountryFeature> {
        self.features.get(id.index())
    }

    /// Features in load order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &CountryFeature)> + '_ {
        self.features
            .iter()
            .enumerate()
            .map(|(idx, f)| (FeatureId(idx as u32), f))
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        (0..self.features.len()).map(|idx| FeatureId(idx as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::feature::{CountryFeature, FeatureId};
    use crate::geometry::Geometry;

    #[test]
    fn ids_follow_load_order() {
        let world = World::from_features(vec![
            CountryFeature::new(Some("A".into()), Default::default(), Geometry::Sphere),
            CountryFeature::new(Some("B".into()), Default::default(), Geometry::Sphere),
        ]);
        let ids: Vec<_> = world.ids().collect();
        assert_eq!(ids, vec![FeatureId(0), FeatureId(1)]);
        assert_eq!(
            world.get(FeatureId(1)).and_then(|f| f.source_id.as_deref()),
            Some("B")
        );
        assert!(world.get(FeatureId(2)).is_none());
    }
}
