use std::path::Path;
use std::time::Duration;

use colored::*;
use error_common::{codes, PulseError, Result};
use pulseiq_client::{ChatTurn, DashboardView, DocumentUpload, PulseApp, Route, Screen, SignupForm};

use crate::cli::{ActivityCommand, Command};
use crate::output;

pub async fn run(app: &PulseApp, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(app, &email, &password).await,
        Command::Logout => {
            let route = app.sign_out().await?;
            println!("{} signed out, next stop {}", "✓".bright_green(), route);
            Ok(())
        }
        Command::Signup { name, email, password, confirm } => {
            let form = SignupForm { full_name: name, email, password, confirm_password: confirm };
            let route = app.signup(&form)?;
            println!("{} account details accepted, log in at {}", "✓".bright_green(), route);
            Ok(())
        }
        Command::Status => status(app).await,
        Command::Open { path } => open(app, &path).await,
        Command::Monitor { ticks } => monitor(app, ticks).await,
        Command::Chat { message, confirm } => chat(app, &message, confirm).await,
        Command::Upload { file, mime } => upload(app, &file, mime).await,
        Command::Activity(ActivityCommand::List) => {
            let records = app.activity().read_all().await;
            if records.is_empty() {
                println!("{}", "No activity yet".dimmed());
            }
            for record in &records {
                println!("{}", output::activity_line(record));
            }
            Ok(())
        }
        Command::Activity(ActivityCommand::Clear) => {
            app.activity().clear().await;
            println!("{} activity log cleared", "✓".bright_green());
            Ok(())
        }
        Command::Feed { wait } => feed(app, wait).await,
        Command::Trigger => {
            let dashboard = dashboard(app).await?;
            let ticket = dashboard.trigger_simulation().await?;
            println!(
                "{} crash simulation started, incident {}",
                "✓".bright_green(),
                ticket.incident_id.bright_white()
            );
            Ok(())
        }
        Command::Cancel => {
            dashboard(app).await?.cancel_simulation().await;
            println!("{} cancel request sent", "✓".bright_green());
            Ok(())
        }
    }
}

async fn login(app: &PulseApp, email: &str, password: &str) -> Result<()> {
    match app.login(email, password).await {
        Ok(route) => {
            println!("{} logged in, opening {}", "✓".bright_green(), route);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".bright_red(), "Invalid credentials".bright_red());
            Err(e.into())
        }
    }
}

async fn status(app: &PulseApp) -> Result<()> {
    let user = app.session().current_user().await?;
    match user {
        Some(user) => println!("Session:  {}", user.bright_green()),
        None => println!("Session:  {}", "logged out".bright_yellow()),
    }
    println!("Backend:  {}", app.config().backend.base_url.bright_white());
    println!("Storage:  {}", app.config().storage.path);
    println!("Activity: {} records", app.activity().read_all().await.len());
    Ok(())
}

async fn open(app: &PulseApp, path: &str) -> Result<()> {
    let screen = app.navigate(path).await?;
    let route = screen.route();
    if !was_redirected(path, route) {
        println!("{} {}", "→".bright_cyan(), route);
    } else {
        println!("{} {} redirected to {}", "→".bright_cyan(), path, route.to_string().bright_yellow());
    }

    match &screen {
        Screen::Dashboard(view) => {
            for line in output::vitals_lines(&view.vitals()) {
                println!("  {line}");
            }
        }
        Screen::Profile(view) => {
            let profile = view.editor().committed();
            println!("  {} ({}), blood type {}", profile.name, profile.age, profile.blood_type);
        }
        Screen::Landing | Screen::Login => {}
    }
    Ok(())
}

/// Whether the guard sent `requested` somewhere other than where it points
fn was_redirected(requested: &str, landed: Route) -> bool {
    Route::from_path(requested) != Some(landed)
}

async fn dashboard(app: &PulseApp) -> Result<DashboardView> {
    match app.navigate("/dashboard").await? {
        Screen::Dashboard(view) => Ok(view),
        other => Err(PulseError::auth(
            codes::authentication::SESSION_MISSING,
            format!("not logged in, redirected to {}", other.route()),
        )),
    }
}

async fn monitor(app: &PulseApp, ticks: u32) -> Result<()> {
    let view = dashboard(app).await?;
    let mut vitals = view.vitals_updates();
    let mut seen = view.transcript().len();

    println!("{}", "Live vitals".bright_cyan().bold());
    for line in output::vitals_lines(&view.vitals()) {
        println!("  {line}");
    }

    for tick in 1..=ticks {
        if vitals.changed().await.is_err() {
            break;
        }
        let snapshot = *vitals.borrow_and_update();
        println!("{} {}", "tick".dimmed(), tick);
        for line in output::vitals_lines(&snapshot) {
            println!("  {line}");
        }

        let transcript = view.transcript();
        for entry in transcript.iter().skip(seen) {
            println!("{}", output::chat_line(entry));
        }
        seen = transcript.len();
    }
    Ok(())
}

async fn chat(app: &PulseApp, message: &str, confirm: bool) -> Result<()> {
    let view = dashboard(app).await?;
    let assistant = view.assistant();
    let before = view.transcript().len();

    match assistant.send_message(message).await {
        ChatTurn::Ignored => {
            return Err(PulseError::validation(codes::validation::INVALID_INPUT, "message is empty"));
        }
        ChatTurn::Answered | ChatTurn::Failed => {}
    }

    if confirm {
        if let Some(proposal) = assistant.pending_proposal() {
            assistant.confirm_appointment(&proposal).await;
        }
    }

    for entry in view.transcript().iter().skip(before) {
        println!("{}", output::chat_line(entry));
    }
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn upload(app: &PulseApp, file: &Path, mime: Option<String>) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| PulseError::validation(codes::validation::INVALID_INPUT, format!("{}: {e}", file.display())))?;
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let mime = mime.unwrap_or_else(|| guess_mime(file).to_string());

    let view = dashboard(app).await?;
    let before = view.transcript().len();
    view.assistant().upload_document(DocumentUpload::new(name, mime, bytes)).await;

    for entry in view.transcript().iter().skip(before) {
        println!("{}", output::chat_line(entry));
    }
    Ok(())
}

async fn feed(app: &PulseApp, wait: u64) -> Result<()> {
    let view = match app.navigate("/profile").await? {
        Screen::Profile(view) => view,
        other => {
            return Err(PulseError::auth(
                codes::authentication::SESSION_MISSING,
                format!("not logged in, redirected to {}", other.route()),
            ))
        }
    };

    let mut updates = view.feed_updates();
    if tokio::time::timeout(Duration::from_secs(wait), updates.changed()).await.is_err() {
        tracing::warn!(wait_secs = wait, "activity feed did not refresh in time");
    }

    let items = view.feed();
    if items.is_empty() {
        println!("{}", "No server activity".dimmed());
    }
    for item in &items {
        println!("{}", output::feed_line(item));
    }
    Ok(())
}
