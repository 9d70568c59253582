//! When steps for quick-capture BDD scenarios.

use super::world::{QuickCaptureWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"the line "{line}" is captured"#)]
fn capture_line(world: &mut QuickCaptureWorld, line: String) {
    let result = run_async(world.service.capture(&line));
    world.capture_result = Some(result);
}
