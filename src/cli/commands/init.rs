use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Created config.toml with default settings");
        println!("  Add search API keys under [search] or via GOOGLE_API_KEY, GOOGLE_CSE_CX,");
        println!("  BRAVE_API_KEY and SERPAPI_KEY.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}
