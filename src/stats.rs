/// Mock livability indicators shown in the province panel. One row per
/// metric: display label, placeholder value for the selected province,
/// and placeholder value for the origin-city comparison. Both columns
/// intentionally share the same key set so the flat list and the flipped
/// comparison table always show identical indicators.
pub const METRICS: [(&str, &str, &str); 19] = [
    ("Population", "1.5M", "3.3M"),
    ("Avg rent", "$750", "$950"),
    ("Safety", "High", "Medium"),
    ("Climate", "Temperate", "Mediterranean"),
    ("Healthcare", "Good", "Very good"),
    ("Education", "High quality", "Excellent"),
    ("Transport", "Efficient", "Very efficient"),
    ("Expat community", "Active", "Very active"),
    ("Nightlife", "Vibrant", "Intense"),
    ("Internet", "200 Mbps", "300 Mbps"),
    ("Cost of living", "Moderate", "High"),
    ("Air quality", "Good", "Fair"),
    ("Green spaces", "Plenty", "Moderate"),
    ("Walkability", "Excellent", "Good"),
    ("Job market", "Growing", "Competitive"),
    ("Taxes", "Reasonable", "High"),
    ("Noise level", "Low", "Medium"),
    ("Traffic", "Moderate", "Heavy"),
    ("Weather consistency", "Stable", "Mild"),
];

#[cfg(test)]
mod tests {
    use super::METRICS;
    use std::collections::HashSet;

    #[test]
    fn both_views_cover_the_same_key_set() {
        // The flat list shows (label, province value); the flipped table
        // shows (label, province value, origin value). Same labels, no
        // duplicates, nothing empty.
        let labels: HashSet<&str> = METRICS.iter().map(|(label, _, _)| *label).collect();
        assert_eq!(labels.len(), METRICS.len());
        for (label, province, origin) in METRICS {
            assert!(!label.is_empty());
            assert!(!province.is_empty());
            assert!(!origin.is_empty());
        }
    }
}
