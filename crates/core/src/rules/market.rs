pub const GLOBAL_MARKET: &str = "GLOBAL";

const MARKET_ALIASES: &[(&str, &[&str])] = &[
    ("AU", &["AU", "AUS", "AUST", "AUSTRALIA"]),
    ("NZ", &["NZ", "NZL", "NEW ZEALAND", "AOTEAROA"]),
    (
        "GB",
        &["GB", "GBR", "UK", "UNITED KINGDOM", "GREAT BRITAIN", "ENGLAND"],
    ),
    ("US", &["US", "USA", "UNITED STATES", "AMERICA"]),
    ("SG", &["SG", "SGP", "SINGAPORE"]),
    (GLOBAL_MARKET, &[GLOBAL_MARKET, "WORLDWIDE", "INTERNATIONAL"]),
];

/// Normalise a free-text market into a short code.
///
/// Known aliases map to their code; anything else becomes the first three
/// alphanumeric characters, uppercased. Blank input is `GLOBAL`.
pub fn normalise_market_code(input: &str) -> String {
    let upper = input.trim().to_uppercase();
    if upper.is_empty() {
        return GLOBAL_MARKET.to_string();
    }

    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    let dotless = collapsed.replace('.', "");
    for (code, aliases) in MARKET_ALIASES {
        if aliases.iter().any(|alias| *alias == collapsed || *alias == dotless) {
            return (*code).to_string();
        }
    }

    let prefix: String = upper
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect();
    if prefix.is_empty() {
        GLOBAL_MARKET.to_string()
    } else {
        prefix
    }
}
