use anyhow::Result;
use microzoo::domain::ports::TunnelSession;
use microzoo::presentation::factory::{create_check_use_case, create_deploy_use_case};
use microzoo::MicrozooError;

use super::{interrupt_flag, Context};
use crate::ui::output::{print_check, print_compiled, print_deployed, print_stopped};

pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let running = interrupt_flag()?;
    let check = create_check_use_case(&ctx.settings).map_err(MicrozooError::from)?;
    let compiled = ctx.compile(source)?;
    print_compiled(&compiled, ctx.args.json);

    let use_case = create_deploy_use_case(ctx.args.target, &ctx.settings, ctx.stdio());
    let mut report = use_case.execute(&compiled.artifact)?;
    print_deployed(&report, ctx.args.json);

    let tunnels: Option<&mut dyn TunnelSession> = match report.tunnels.as_mut() {
        Some(group) => Some(group.as_mut()),
        None => None,
    };
    let result = check.execute(&compiled.system, tunnels, &running);
    print_check(&result, ctx.args.json);

    if let Some(mut group) = report.tunnels.take() {
        group.stop();
        print_stopped(ctx.args.json);
    }

    match result.into_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
