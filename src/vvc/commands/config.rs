use crate::commands::{CmdMessage, CmdResult, SitePaths};
use crate::config::VvcConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(paths: &SitePaths, action: ConfigAction) -> Result<CmdResult> {
    let dir = &paths.site;
    match action {
        ConfigAction::ShowAll => {
            let config = VvcConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = VvcConfig::load(dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = VvcConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e.to_string()));
                return Ok(res);
            }
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or(value);
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!("{} set to {}", key, display_val)));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn set_persists_normalized_value() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        let result = run(
            &paths,
            ConfigAction::Set("login-path".into(), "signin".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].content, "login-path set to /signin");

        let result = run(&paths, ConfigAction::ShowKey("login-path".into())).unwrap();
        assert_eq!(result.messages[0].content, "/signin");
    }

    #[test]
    fn bad_key_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        let result = run(&paths, ConfigAction::Set("nope".into(), "1".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!dir.path().join("config.json").exists());
    }
}
