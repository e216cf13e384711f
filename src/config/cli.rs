use crate::domain::model::Category;
use crate::utils::error::{IcpError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_proxy_url, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "icpscan")]
#[command(about = "Batch ICP registration lookup for organization names")]
pub struct CliConfig {
    /// Organization name, "name(alias)" pair, or path to a newline-delimited file of them
    #[arg(short = 't', long)]
    pub target: String,

    /// Service categories to query: 1=website, 2=APP, 3=mini-program, comma separated
    #[arg(long = "types", default_value = "1")]
    pub types: String,

    /// Output CSV file
    #[arg(short = 'o', long, default_value = "result.csv")]
    pub output: String,

    /// Proxy URL (http://, https:// or socks5://)
    #[arg(short = 'p', long)]
    pub proxy: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Selected categories in fixed order of first occurrence. Unknown
    /// codes are skipped; an empty selection is a configuration error.
    pub fn categories(&self) -> Result<Vec<Category>> {
        let mut categories = Vec::new();
        for code in self.types.split(',') {
            if let Some(category) = Category::from_client_code(code.trim()) {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
        if categories.is_empty() {
            return Err(IcpError::Config {
                message: format!("no valid category in '{}', supported codes: 1,2,3", self.types),
            });
        }
        Ok(categories)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("target", &self.target)?;
        validate_non_empty_string("output", &self.output)?;
        if let Some(proxy) = &self.proxy {
            validate_proxy_url("proxy", proxy)?;
        }
        self.categories()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(types: &str) -> CliConfig {
        CliConfig {
            target: "某公司".to_string(),
            types: types.to_string(),
            output: "result.csv".to_string(),
            proxy: None,
            verbose: false,
        }
    }

    #[test]
    fn test_categories_parse_and_dedup() {
        assert_eq!(config("1").categories().unwrap(), vec![Category::Website]);
        assert_eq!(
            config("1, 3 ,2").categories().unwrap(),
            vec![Category::Website, Category::MiniProgram, Category::App]
        );
        assert_eq!(
            config("1,1,2").categories().unwrap(),
            vec![Category::Website, Category::App]
        );
    }

    #[test]
    fn test_unknown_codes_are_skipped() {
        assert_eq!(
            config("1,9").categories().unwrap(),
            vec![Category::Website]
        );
    }

    #[test]
    fn test_no_valid_category_is_fatal() {
        assert!(matches!(
            config("9").categories().unwrap_err(),
            IcpError::Config { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let mut cfg = config("1");
        cfg.target = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_proxy_scheme() {
        let mut cfg = config("1");
        cfg.proxy = Some("ftp://127.0.0.1:21".to_string());
        assert!(cfg.validate().is_err());

        cfg.proxy = Some("socks5://127.0.0.1:1080".to_string());
        assert!(cfg.validate().is_ok());
    }
}
