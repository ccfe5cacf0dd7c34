use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use microzoo::domain::ports::{DeployError, SuperviseOutcome, TunnelError, TunnelSession};
use microzoo::presentation::factory::create_deploy_use_case;
use microzoo::MicrozooError;
use tracing::info;

use super::{interrupt_flag, Context};
use crate::ui::output::{
    print_compiled, print_deployed, print_stopped, print_tunnel_failed, print_tunnels,
    print_waiting,
};

/// How often the supervision loop checks tunnel events
pub const SUPERVISE_POLL: Duration = Duration::from_millis(200);
/// Pause before re-spawning a failed tunnel group
const RESTART_DELAY: Duration = Duration::from_secs(1);
/// Group failures tolerated before `deploy` gives up
const MAX_RESTARTS: u32 = 5;

pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let compiled = ctx.compile(source)?;
    print_compiled(&compiled, ctx.args.json);

    let use_case = create_deploy_use_case(ctx.args.target, &ctx.settings, ctx.stdio());
    let mut report = use_case.execute(&compiled.artifact)?;
    print_deployed(&report, ctx.args.json);

    if let Some(tunnels) = report.tunnels.as_mut() {
        let running = interrupt_flag()?;
        print_waiting(ctx.args.json);
        keep_open(tunnels.as_mut(), &running, ctx.args.json)?;
        print_stopped(ctx.args.json);
    }
    Ok(())
}

/// Supervise until Ctrl-C, restarting the whole group after each failure
fn keep_open(tunnels: &mut dyn TunnelSession, running: &AtomicBool, json: bool) -> Result<()> {
    let mut restarts = 0;
    loop {
        match tunnels.supervise(running, SUPERVISE_POLL) {
            SuperviseOutcome::Interrupted => return Ok(()),
            SuperviseOutcome::GroupFailed { tunnel, reason } => {
                let restarting = restarts < MAX_RESTARTS;
                print_tunnel_failed(&tunnel, &reason, restarting, json);
                if !restarting {
                    tunnels.stop();
                    return Err(tunnel_error(TunnelError::Failed { tunnel, reason }).into());
                }
                restarts += 1;
                thread::sleep(RESTART_DELAY);
                info!(attempt = restarts, "restarting tunnels");
                tunnels.restart().map_err(tunnel_error)?;
                print_tunnels(tunnels, json);
            }
        }
    }
}

fn tunnel_error(err: TunnelError) -> MicrozooError {
    MicrozooError::Deploy(DeployError::Tunnel(err))
}
