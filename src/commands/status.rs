use anyhow::Result;
use microzoo::presentation::factory::create_deploy_use_case;

use super::Context;
use crate::ui::output::print_status;

pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let use_case = create_deploy_use_case(ctx.args.target, &ctx.settings, ctx.stdio());
    let report = use_case.status(&ctx.stored(source))?;
    print_status(&report, ctx.args.json);
    Ok(())
}
