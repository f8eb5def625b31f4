use foundation::normalize_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsState {
    pub name: &'static str,
    pub capital: &'static str,
    pub population: u64,
}

/// 2020 census resident population of the 50 states plus the District of
/// Columbia, with each capital.
pub const US_STATES: &[UsState] = &[
    UsState { name: "Alabama", capital: "Montgomery", population: 5_024_279 },
    UsState { name: "Alaska", capital: "Juneau", population: 733_391 },
    UsState { name: "Arizona", capital: "Phoenix", population: 7_151_502 },
    UsState { name: "Arkansas", capital: "Little Rock", population: 3_011_524 },
    UsState { name: "California", capital: "Sacramento", population: 39_538_223 },
    UsState { name: "Colorado", capital: "Denver", population: 5_773_714 },
    UsState { name: "Connecticut", capital: "Hartford", population: 3_605_944 },
    UsState { name: "Delaware", capital: "Dover", population: 989_948 },
    UsState { name: "District of Columbia", capital: "Washington", population: 689_545 },
    UsState { name: "Florida", capital: "Tallahassee", population: 21_538_187 },
    UsState { name: "Georgia", capital: "Atlanta", population: 10_711_908 },
    UsState { name: "Hawaii", capital: "Honolulu", population: 1_455_271 },
    UsState { name: "Idaho", capital: "Boise", population: 1_839_106 },
    UsState { name: "Illinois", capital: "Springfield", population: 12_812_508 },
    UsState { name: "Indiana", capital: "Indianapolis", population: 6_785_528 },
    UsState { name: "Iowa", capital: "Des Moines", population: 3_190_369 },
    UsState { name: "Kansas", capital: "Topeka", population: 2_937_880 },
    UsState { name: "Kentucky", capital: "Frankfort", population: 4_505_836 },
    UsState { name: "Louisiana", capital: "Baton Rouge", population: 4_657_757 },
    UsState { name: "Maine", capital: "Augusta", population: 1_362_359 },
    UsState { name: "Maryland", capital: "Annapolis", population: 6_177_224 },
    UsState { name: "Massachusetts", capital: "Boston", population: 7_029_917 },
    UsState { name: "Michigan", capital: "Lansing", population: 10_077_331 },
    UsState { name: "Minnesota", capital: "Saint Paul", population: 5_706_494 },
    UsState { name: "Mississippi", capital: "Jackson", population: 2_961_279 },
    UsState { name: "Missouri", capital: "Jefferson City", population: 6_154_913 },
    UsState { name: "Montana", capital: "Helena", population: 1_084_225 },
    UsState { name: "Nebraska", capital: "Lincoln", population: 1_961_504 },
    UsState { name: "Nevada", capital: "Carson City", population: 3_104_614 },
    UsState { name: "New Hampshire", capital: "Concord", population: 1_377_529 },
    UsState { name: "New Jersey", capital: "Trenton", population: 9_288_994 },
    UsState { name: "New Mexico", capital: "Santa Fe", population: 2_117_522 },
    UsState { name: "New York", capital: "Albany", population: 20_201_249 },
    UsState { name: "North Carolina", capital: "Raleigh", population: 10_439_388 },
    UsState { name: "North Dakota", capital: "Bismarck", population: 779_094 },
    UsState { name: "Ohio", capital: "Columbus", population: 11_799_448 },
    UsState { name: "Oklahoma", capital: "Oklahoma City", population: 3_959_353 },
    UsState { name: "Oregon", capital: "Salem", population: 4_237_256 },
    UsState { name: "Pennsylvania", capital: "Harrisburg", population: 13_002_700 },
    UsState { name: "Rhode Island", capital: "Providence", population: 1_097_379 },
    UsState { name: "South Carolina", capital: "Columbia", population: 5_118_425 },
    UsState { name: "South Dakota", capital: "Pierre", population: 886_667 },
    UsState { name: "Tennessee", capital: "Nashville", population: 6_910_840 },
    UsState { name: "Texas", capital: "Austin", population: 29_145_505 },
    UsState { name: "Utah", capital: "Salt Lake City", population: 3_271_616 },
    UsState { name: "Vermont", capital: "Montpelier", population: 643_077 },
    UsState { name: "Virginia", capital: "Richmond", population: 8_631_393 },
    UsState { name: "Washington", capital: "Olympia", population: 7_705_281 },
    UsState { name: "West Virginia", capital: "Charleston", population: 1_793_716 },
    UsState { name: "Wisconsin", capital: "Madison", population: 5_893_718 },
    UsState { name: "Wyoming", capital: "Cheyenne", population: 576_851 },
];

/// Sum of [`US_STATES`] populations, used when the remote lookup has no
/// figure for the United States.
pub fn us_population_total() -> u64 {
    US_STATES.iter().map(|s| s.population).sum()
}

/// Whether a country name refers to the United States.
pub fn is_us_name(name: &str) -> bool {
    matches!(
        normalize_name(name).as_str(),
        "united states of america" | "united states" | "usa" | "u.s."
    )
}
