//! Fill and undo handlers.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use smartfill_browser_cdp::CdpPage;
use smartfill_config::Config;
use smartfill_core::{
    Autofill, AutofillError, FillExecutor, FillPreview, FrameAgent, LocalPage, PageCapture,
    PrepareOutcome,
};
use smartfill_protocols::{FrameChannel, StateStore, TOP_FRAME};
use smartfill_resolver_anthropic::AnthropicResolver;

use crate::cli::PageArgs;
use crate::UserError;

/// The page a command works on. A snapshot page is written back to its file
/// after a change.
enum Target {
    Browser(Arc<CdpPage>),
    Snapshot { page: Arc<LocalPage>, file: std::path::PathBuf },
}

impl Target {
    fn channel(&self) -> Arc<dyn FrameChannel> {
        match self {
            Self::Browser(page) => page.clone(),
            Self::Snapshot { page, .. } => page.clone(),
        }
    }

    async fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Self::Snapshot { page, file } = self {
            if let Some(capture) = page.to_capture().await {
                tokio::fs::write(file, serde_json::to_string_pretty(&capture)?).await?;
                info!("Wrote page back to {}", file.display());
            }
        }
        Ok(())
    }
}

fn frame_agent(config: &Config) -> FrameAgent {
    FrameAgent::new(FillExecutor::new().with_focus_and_blur(config.fill.focus_and_blur))
}

async fn open_target(config: &Config, args: &PageArgs) -> Result<Target, Box<dyn std::error::Error>> {
    match &args.snapshot {
        Some(file) => Ok(Target::Snapshot {
            page: Arc::new(load_snapshot(file, frame_agent(config)).await?),
            file: file.clone(),
        }),
        None => {
            let filter = args.target.as_deref().or(config.browser.target_url.as_deref());
            let page = CdpPage::connect(&config.browser.endpoint, filter, frame_agent(config)).await?;
            Ok(Target::Browser(Arc::new(page)))
        }
    }
}

async fn load_snapshot(file: &Path, agent: FrameAgent) -> Result<LocalPage, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(file).await?;
    let capture: PageCapture = serde_json::from_str(&raw)?;
    let tab_id = format!("snapshot:{}", file.display());
    Ok(LocalPage::from_capture(tab_id, &capture).with_agent(agent))
}

fn autofill(config: &Config, store: Arc<dyn StateStore>) -> Autofill {
    let resolver = AnthropicResolver::new()
        .with_base_url(&config.resolver.base_url)
        .with_model(&config.resolver.model)
        .with_api_version(&config.resolver.api_version)
        .with_max_tokens(config.resolver.max_tokens)
        .with_timeout(Duration::from_secs(config.resolver.timeout_seconds));

    Autofill::new(store, Arc::new(resolver))
        .with_frame_timeout(Duration::from_millis(config.orchestrator.frame_timeout_ms))
}

fn user_error(e: AutofillError) -> Box<dyn std::error::Error> {
    UserError(e.user_message()).into()
}

fn print_preview(preview: &FillPreview) {
    let entries = preview.entries();
    println!("{} ({})", preview.context.title, preview.context.url);
    println!("{}", "-".repeat(60));
    for entry in &entries {
        let frame = if entry.frame_id == TOP_FRAME {
            String::new()
        } else {
            format!(" [frame {}]", entry.frame_id)
        };
        println!("  {}{}: {}", entry.label, frame, entry.value);
    }
    let blank = preview.fields.len() - entries.len();
    if blank > 0 {
        println!("  ({} fields left blank)", blank);
    }
    if preview.frames_failed > 0 {
        println!("  ({} frames could not be scanned)", preview.frames_failed);
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Scan, preview, confirm and fill.
pub(crate) async fn fill(
    config: &Config,
    store: Arc<dyn StateStore>,
    args: &PageArgs,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let autofill = autofill(config, store);
    // Fail on a missing key or profile before touching the browser.
    autofill.check_preconditions().await.map_err(user_error)?;

    let target = open_target(config, args).await?;
    let preview = match autofill.prepare(target.channel()).await.map_err(user_error)? {
        PrepareOutcome::NothingToFill => {
            println!("No fillable fields found on this page.");
            return Ok(());
        }
        PrepareOutcome::Ready(preview) => preview,
    };

    print_preview(&preview);
    if preview.is_empty() {
        println!("No fields were filled. Check if the form is compatible.");
        return Ok(());
    }
    if !yes && !confirm(&format!("Fill {} fields?", preview.entries().len()))? {
        println!("Fill cancelled.");
        return Ok(());
    }

    let outcome = autofill
        .apply(target.channel(), &preview)
        .await
        .map_err(user_error)?;
    target.save().await?;

    if outcome.filled_count > 0 {
        println!("Successfully filled {} fields!", outcome.filled_count);
    } else if outcome.errors.is_empty() {
        println!("No fields were filled. Check if the form is compatible.");
    } else {
        println!("No fields were filled.");
    }
    for error in &outcome.errors {
        println!("  ! {}", error);
    }
    Ok(())
}

/// Revert the page's last fill.
pub(crate) async fn undo(
    config: &Config,
    store: Arc<dyn StateStore>,
    args: &PageArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let autofill = autofill(config, store);
    let target = open_target(config, args).await?;

    let restored = autofill.undo(target.channel()).await.map_err(user_error)?;
    if restored > 0 {
        target.save().await?;
        println!("Undo complete. Restored {} fields.", restored);
    } else {
        println!("Nothing to undo.");
    }
    Ok(())
}
