pub const NO_MATCH: &str = "No Match";

/// CER prefix (first four digits) to market.
pub const MARKET_KEY: [(&str, &str); 46] = [
    ("1020", "Corporate"),
    ("1060", "IT&S"),
    ("5500", "East Texas"),
    ("5501", "East Texas"),
    ("5504", "East Texas"),
    ("5505", "East Texas"),
    ("5510", "East Texas"),
    ("5515", "East Texas"),
    ("5520", "East Texas"),
    ("5525", "East Texas"),
    ("5530", "East Texas"),
    ("5535", "East Texas"),
    ("5540", "East Texas"),
    ("5550", "East Texas"),
    ("5400", "Idaho"),
    ("5404", "Idaho"),
    ("5405", "Idaho"),
    ("5480", "Kansas"),
    ("5430", "New Jersey"),
    ("5440", "New Jersey"),
    ("1500", "New Mexico"),
    ("5050", "New Mexico"),
    ("5055", "New Mexico"),
    ("5061", "New Mexico"),
    ("5070", "New Mexico"),
    ("5082", "New Mexico"),
    ("5125", "New Mexico"),
    ("1600", "Oklahoma"),
    ("5200", "Oklahoma"),
    ("5201", "Oklahoma"),
    ("5210", "Oklahoma"),
    ("5230", "Oklahoma"),
    ("5251", "Oklahoma"),
    ("5260", "Oklahoma"),
    ("5265", "Oklahoma"),
    ("5270", "Oklahoma"),
    ("5275", "Oklahoma"),
    ("5280", "Oklahoma"),
    ("5300", "West Texas"),
    ("5301", "West Texas"),
    ("5310", "West Texas"),
    ("5311", "West Texas"),
    ("5316", "West Texas"),
    ("5320", "West Texas"),
    ("5410", "West Texas"),
    ("5415", "West Texas"),
];

pub fn market_from_cer(cer_number: &str) -> &'static str {
    let prefix: String = cer_number.chars().take(4).collect();
    if prefix.chars().count() < 4 {
        return NO_MATCH;
    }

    MARKET_KEY
        .iter()
        .find(|(key, _)| *key == prefix)
        .map(|(_, market)| *market)
        .unwrap_or(NO_MATCH)
}
