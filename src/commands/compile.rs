use anyhow::Result;

use super::Context;
use crate::ui::output::print_compiled;

pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let result = ctx.compile(source)?;
    print_compiled(&result, ctx.args.json);
    Ok(())
}
