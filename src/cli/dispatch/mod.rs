use crate::cli::actions::Action;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Dashboard {
        api_url: matches
            .get_one("api-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --api-url"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_api_url() {
        let matches = commands::new().get_matches_from(vec![
            "panelo",
            "--api-url",
            "http://localhost:3000",
        ]);

        let Ok(Action::Dashboard { api_url }) = handler(&matches) else {
            panic!("expected dashboard action");
        };

        assert_eq!(api_url, "http://localhost:3000");
    }

    #[test]
    fn test_handler_default() {
        temp_env::with_vars([("PANELO_API_URL", None::<String>)], || {
            let matches = commands::new().get_matches_from(vec!["panelo"]);

            let Ok(Action::Dashboard { api_url }) = handler(&matches) else {
                panic!("expected dashboard action");
            };

            assert_eq!(api_url, commands::DEFAULT_API_URL);
        });
    }
}
