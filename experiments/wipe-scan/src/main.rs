use {
    anyhow::{Context, Result},
    certs::*,
    scan::*,
    std::{env, io::Write, sync::Arc},
    tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    video::*,
};

const USERNAME_ENV: &str = "WIPE_USERNAME";
const PASSWORD_ENV: &str = "WIPE_PASSWORD";
const CAMERA_ENV: &str = "WIPE_CAMERA";
const FRAMES_DIR_ENV: &str = "WIPE_FRAMES_DIR";
const LOG_DIR_ENV: &str = "WIPE_LOG_DIR";

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

// still frames when WIPE_FRAMES_DIR is set, otherwise the V4L2 camera
fn camera() -> Result<(CameraSession, CaptureConstraints)> {
    let constraints = CaptureConstraints::default().with_facing(FacingMode::Environment);
    match env::var(FRAMES_DIR_ENV) {
        Ok(dir) => Ok((CameraSession::still(), constraints.with_device(dir))),
        Err(_) => live_camera(constraints),
    }
}

#[cfg(feature = "v4l2")]
fn live_camera(constraints: CaptureConstraints) -> Result<(CameraSession, CaptureConstraints)> {
    let constraints = match env::var(CAMERA_ENV) {
        Ok(device) => constraints.with_device(device),
        Err(_) => constraints,
    };
    Ok((CameraSession::v4l2(), constraints))
}

#[cfg(not(feature = "v4l2"))]
fn live_camera(_constraints: CaptureConstraints) -> Result<(CameraSession, CaptureConstraints)> {
    anyhow::bail!(
        "no camera: set {} to a directory of frames, or build with --features v4l2 (device from {})",
        FRAMES_DIR_ENV,
        CAMERA_ENV
    )
}

fn print_dashboard(dashboard: &Dashboard) {
    if let Some(user) = dashboard.user() {
        println!();
        println!("Certificates of {}", user.name);
    }
    if dashboard.certificates().is_empty() {
        println!("  No certificates yet.");
    }
    let selected = dashboard.selected().map(|cert| cert.id.clone());
    for (i, cert) in dashboard.certificates().iter().enumerate() {
        let marker = if Some(&cert.id) == selected.as_ref() { '>' } else { ' ' };
        println!("{} {:>3}. {}", marker, i + 1, cert.summary_line());
    }
    if let Some(error) = dashboard.error() {
        println!("! {}", error);
    }
}

fn print_details(cert: &Certificate) {
    println!();
    println!("{}", cert.device_name);
    println!("Wipe Certificate issued on {}", cert.wipe_date);
    for (label, value) in cert.details() {
        println!("  {:<18}{}", label, value);
    }
    println!("  PDF download is not implemented.");
}

async fn scan_once(
    dashboard: &mut Dashboard,
    client: &ApiClient,
    user: User,
    camera: CameraSession,
    constraints: CaptureConstraints,
) -> Result<()> {
    dashboard.begin_scan();
    let (controller, mut events) = AcquisitionController::new(
        camera,
        DecoderProvider::global(),
        Arc::new(client.clone()),
        user,
        constraints,
    );
    let mut states = controller.subscribe();

    println!("Point the camera at the certificate QR code, Ctrl-C to cancel.");
    if let ScanState::Failed(kind) = controller.open().await {
        let message = controller
            .last_error()
            .map(|error| error.user_message())
            .unwrap_or_else(|| kind.message().to_string());
        dashboard.record_error(message);
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
                println!("Scan cancelled.");
                return Ok(());
            }

            event = events.recv() => {
                match event {
                    Some(ScanEvent::Ingested(cert)) => {
                        println!("Added {}.", cert.device_name);
                        dashboard.record_ingested(cert);
                    }
                    Some(ScanEvent::IngestionFailed(error)) => dashboard.record_error(error.user_message()),
                    None => {}
                }
                return Ok(());
            }

            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = states.borrow_and_update().clone();
                match state {
                    ScanState::Decoded(_) => println!("Code found, adding certificate..."),
                    ScanState::Failed(kind) => {
                        dashboard.record_error(kind.message());
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{}: ", label);
    std::io::stdout().flush().ok();
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

// the first attempt uses the environment, later ones ask on stdin
async fn login(
    dashboard: &mut Dashboard,
    client: &ApiClient,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    let mut credentials = Credentials::new(
        env_or(USERNAME_ENV, "demouser"),
        env_or(PASSWORD_ENV, "password"),
    );
    loop {
        match dashboard.login(client, &credentials).await {
            Ok(()) => return Ok(true),
            Err(error) => println!("! {}", error),
        }
        let Some(username) = prompt(lines, "username").await? else {
            return Ok(false);
        };
        if username.is_empty() {
            return Ok(false);
        }
        let Some(password) = prompt(lines, "password").await? else {
            return Ok(false);
        };
        credentials = Credentials::new(username, password);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    match env::var(LOG_DIR_ENV) {
        Ok(dir) => base::init_file_logger(dir)?,
        Err(_) => base::init_stdout_logger(),
    }

    let client = ApiClient::new(ApiConfig::from_env())?;
    println!("Secure Wipe certificates at {}", client.config().base_url());

    // one session for the whole process, so its claim covers every scan
    let camera = camera();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut dashboard = Dashboard::new();
    if !login(&mut dashboard, &client, &mut lines).await? {
        return Ok(());
    }
    if let Err(error) = dashboard.refresh(&client).await {
        log::warn!("initial refresh failed: {}", error);
    }
    print_dashboard(&dashboard);
    if let Some(cert) = dashboard.selected() {
        print_details(cert);
    }

    loop {
        print!("\n[s]can  [r]efresh  <n> details  [l]ogout > ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "s" => {
                let user = dashboard.user().cloned().context("not logged in")?;
                match &camera {
                    Ok((session, constraints)) => {
                        scan_once(&mut dashboard, &client, user, session.clone(), constraints.clone())
                            .await?
                    }
                    Err(error) => dashboard.record_error(error.to_string()),
                }
                print_dashboard(&dashboard);
                if let Some(cert) = dashboard.selected() {
                    print_details(cert);
                }
            }
            "r" => {
                if let Err(error) = dashboard.refresh(&client).await {
                    log::warn!("refresh failed: {}", error);
                }
                print_dashboard(&dashboard);
            }
            "l" | "q" => {
                dashboard.logout();
                println!("Logged out.");
                break;
            }
            other => {
                let index = other.parse::<usize>().ok().filter(|n| *n >= 1);
                let id = index
                    .and_then(|n| dashboard.certificates().get(n - 1))
                    .map(|cert| cert.id.clone());
                match id {
                    Some(id) => {
                        dashboard.select(&id);
                        if let Some(cert) = dashboard.selected() {
                            print_details(cert);
                        }
                    }
                    None => println!("unknown command: {}", other),
                }
            }
        }
    }

    Ok(())
}
