//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::config::AppConfig;
use crate::errors::{LinkError, Result};

/// 生成示例配置文件
///
/// 未指定路径时输出到标准输出；目标文件已存在且未指定 `force` 时拒绝覆盖。
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<()> {
    let Some(path) = output_path else {
        print!("{}", AppConfig::generate_sample_config());
        return Ok(());
    };

    if !force && Path::new(path).exists() {
        return Err(LinkError::config(format!(
            "{} already exists, pass --force to overwrite",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );
    AppConfig::default().save_to_file(path)?;
    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
