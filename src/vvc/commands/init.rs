use crate::commands::{CmdMessage, CmdResult, SitePaths};
use crate::config::VvcConfig;
use crate::error::Result;
use std::fs;

pub fn run(paths: &SitePaths) -> Result<CmdResult> {
    fs::create_dir_all(&paths.site)?;
    let config = VvcConfig::load(&paths.site)?;
    config.save(&paths.site)?;

    let mut result = CmdResult::default().with_config(config);
    result.add_message(CmdMessage::success(format!(
        "Initialized vvc site at {}",
        paths.site.display()
    )));
    Ok(result)
}
