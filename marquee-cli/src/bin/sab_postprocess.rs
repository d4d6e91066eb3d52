//! SABnzbd post-processing script.
//!
//! Point SABnzbd's script setting at this binary. It forwards the finished
//! job to the media manager's `processEpisode` endpoint and echoes the reply.

use anyhow::Context;
use marquee_cli::{NO_FOLDER_MESSAGE, PostProcessRequest, logging};
use marquee_config::ConfigLoader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
        })
        .collect();

    let Some(request) = PostProcessRequest::from_args(&args) else {
        println!("{NO_FOLDER_MESSAGE}");
        return Ok(());
    };

    logging::init("warn");

    let load = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    logging::report_warnings(&load.warnings);

    let body = request.forward(&load.config.postprocess).await?;
    for line in body.lines() {
        println!("{line}");
    }

    Ok(())
}
