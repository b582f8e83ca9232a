//! Base controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Publish the static frame transforms
//!     - Initialise BaseCtrl
//!     - Start the InputClient replaying the input script
//!     - Main loop:
//!         - Control tick (pose error, threshold, obstacle check, velocity)
//!         - Send the command to the sinks
//!         - Write archives
//!         - Cycle management
//!     - Publish a final zero twist and stop
//!
//! # Usage
//!
//! ```text
//! base_ctrl_exec <input_script>
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::{
    env,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

// Internal
use base_ctrl_lib::{
    axes::Twist,
    coordinator::{BaseCtrl, BaseCtrlMode, InitData},
    frame::StaticFrameResolver,
    input_client::InputClient,
    params::ExecParams,
    twist_sink::{ArchiveSink, LogSink, TwistSink},
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LoggerConfig},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("base_ctrl_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LoggerConfig::default(), &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Base Controller Executable\n");
    info!("Running on: {}", host::get_hostname());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("exec.toml").wrap_err("Could not load exec params")?;
    exec_params
        .validate()
        .wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let script_path = script_arg(&args)?;

    // ---- INITIALISE FRAMES ----

    let resolver = Arc::new(StaticFrameResolver::new());

    for t in exec_params.static_transforms.iter() {
        t.publish(&resolver)
            .wrap_err_with(|| format!("Invalid static transform {:?} -> {:?}", t.child, t.parent))?;
    }

    info!(
        "{} static transforms published",
        exec_params.static_transforms.len()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut base_ctrl = BaseCtrl::init(
        InitData {
            params_path: String::from("base_ctrl.toml"),
            resolver: resolver.clone(),
        },
        &session,
    )
    .wrap_err("Failed to initialise BaseCtrl")?;
    info!("BaseCtrl init complete");

    let mut log_sink = LogSink::new();
    let mut archive_sink = match exec_params.archive_outputs {
        true => Some(ArchiveSink::new(&session).wrap_err("Failed to initialise the ArchiveSink")?),
        false => None,
    };

    info!("Module initialisation complete\n");

    // ---- INITIALISE INPUTS ----

    info!("Loading input script from \"{}\"", script_path);

    let mut input_client = InputClient::new(script_path, base_ctrl.state(), resolver.clone())
        .wrap_err("Failed to initialise the InputClient")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s());
    let mut num_cycles: u64 = 0;
    let mut num_consec_cycle_overruns: u64 = 0;
    let mut script_end_instant: Option<Instant> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL PROCESSING ----

        let (output, _report) = base_ctrl.tick();

        if let Some(ref twist) = output {
            log_sink.send(twist);
            if let Some(ref mut s) = archive_sink {
                s.send(twist);
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Some(ref mut s) = archive_sink {
            if let Err(e) = s.write() {
                warn!("Could not write twist archive: {}", e);
            }
        }

        // ---- END OF SCRIPT ----

        // Once the script is over keep running until the base settles or the
        // timeout expires
        if input_client.is_finished() {
            let end = *script_end_instant.get_or_insert_with(Instant::now);

            match base_ctrl.mode() {
                BaseCtrlMode::Idle | BaseCtrlMode::WithinThreshold => {
                    info!("Input script complete and base settled, stopping");
                    break;
                }
                _ if end.elapsed().as_secs_f64() > exec_params.settle_timeout_s => {
                    warn!(
                        "Base did not settle within {} s of the end of the script, stopping",
                        exec_params.settle_timeout_s
                    );
                    break;
                }
                _ => (),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    input_client.stop();

    // Leave the base stopped
    let zero = Twist::zero();
    log_sink.send(&zero);
    if let Some(ref mut s) = archive_sink {
        s.send(&zero);
        s.write().wrap_err("Could not write the final twist archive")?;
    }

    info!("End of execution after {} cycles", num_cycles);

    Ok(())
}

/// Get the input script path from the command line arguments.
fn script_arg(args: &[String]) -> Result<&str, Report> {
    match args {
        [_, script] => Ok(script.as_str()),
        _ => Err(eyre!(
            "Expected exactly one argument (the input script), found {}",
            args.len().saturating_sub(1)
        )),
    }
}
