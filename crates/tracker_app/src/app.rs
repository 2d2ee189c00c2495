use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracker_engine::{
    Controller, ControllerEvent, FileStore, ReqwestBackend, SubmissionDescriptor, SystemClock,
};
use tracker_logging::{tracker_debug, tracker_info};
use url::Url;

use crate::config::AppConfig;
use crate::render;

pub struct App {
    controller: Controller,
    base_url: Url,
}

impl App {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let base_url = config.base_url()?;
        let backend = ReqwestBackend::new(config.backend_settings(base_url.clone()))
            .context("failed to build http client")?;
        let store = FileStore::new(config.cache_dir.clone());
        let controller = Controller::new(
            Arc::new(backend),
            Arc::new(store),
            Arc::new(SystemClock),
            config.controller_settings(),
        );
        tracker_debug!("App ready base_url={} cache_dir={:?}", base_url, config.cache_dir);
        Ok(Self {
            controller,
            base_url,
        })
    }

    /// Submits `source` and prints progress until hand-off. Returns the results URL.
    pub async fn submit(&mut self, source: &str) -> anyhow::Result<Url> {
        let descriptor = descriptor_for(source)?;
        let handle = self.controller.submit(&descriptor).await?;
        println!("{}", render::accepted_line(&handle));

        let mut last_line = String::new();
        while let Some(event) = self.controller.next_event().await {
            match event {
                ControllerEvent::Progress(view) => {
                    let line = render::progress_line(&view);
                    if line != last_line {
                        println!("{line}");
                        last_line = line;
                    }
                }
                ControllerEvent::Completed { result_id, .. } => {
                    println!("{}", render::completed_line(&result_id));
                }
                ControllerEvent::Redirect { target } => {
                    let url = results_url(&self.base_url, &target)?;
                    tracker_info!("Results available at {}", url);
                    println!("{url}");
                    return Ok(url);
                }
                ControllerEvent::Failed { message } => bail!(message),
            }
        }
        bail!("job tracking stopped before a result arrived")
    }

    pub async fn recent(&self) {
        let entries = self.controller.recent().await;
        if entries.is_empty() {
            println!("No recent analyses");
        }
        for entry in &entries {
            println!("{}", render::recent_line(entry));
        }
    }
}

/// `http(s)://` arguments are links; anything else is read from disk.
fn descriptor_for(source: &str) -> anyhow::Result<SubmissionDescriptor> {
    let trimmed = source.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(SubmissionDescriptor::url(trimmed));
    }

    let path = Path::new(source);
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    Ok(SubmissionDescriptor::file(name, bytes))
}

/// Resolves an app-relative redirect target below `base`, keeping any path prefix.
fn results_url(base: &Url, target: &str) -> anyhow::Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(target.trim_start_matches('/'))
        .with_context(|| format!("invalid redirect target `{target}`"))
}
