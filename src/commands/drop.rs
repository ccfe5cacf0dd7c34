use anyhow::Result;
use microzoo::presentation::factory::create_deploy_use_case;

use super::Context;
use crate::ui::output::print_dropped;

pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let use_case = create_deploy_use_case(ctx.args.target, &ctx.settings, ctx.stdio());
    let artifact = use_case.drop_stack(&ctx.stored(source))?;
    print_dropped(&artifact, ctx.args.json);
    Ok(())
}
