//! Built-in scenario exercising the tracker end to end
//!
//! Each scenario publishes its locals as a call frame and lets a tracker
//! created without explicit bindings find them.

use anyhow::{ensure, Result};
use namescope::{enter_frame, shared, Locals, ScopeTracker, Shared};
use serde_json::{json, Value};
use std::collections::HashSet;

type Frame = Shared<Locals<Value>>;

/// Outcome of one scenario
pub struct Check {
    pub name: &'static str,
    pub outcome: Result<()>,
}

/// Run every scenario
pub fn run() -> Vec<Check> {
    let scenarios: [(&'static str, fn() -> Result<()>); 4] = [
        ("function scope", function_scope),
        ("tracker bound in its own scope", self_binding),
        ("extras hide the tracker binding", self_binding_with_extras),
        ("underscore names included", underscore_included),
    ];

    scenarios
        .into_iter()
        .map(|(name, scenario)| Check {
            name,
            outcome: scenario(),
        })
        .collect()
}

fn bind(frame: &Frame, name: &str, value: Value) {
    frame.borrow_mut().insert(name.to_string(), value);
}

fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn function_scope() -> Result<()> {
    // Arguments are bound before the scope starts
    let frame: Frame = shared(Locals::new());
    bind(&frame, "a", json!(3));
    bind(&frame, "b", json!(4));
    let _frame = enter_frame(frame.clone());

    let mut s = ScopeTracker::<Locals<Value>>::new();
    s.scope(|s| -> Result<()> {
        bind(&frame, "x", json!(1));
        bind(&frame, "y", json!(2));
        ensure!(s.diff()? == names(&["x", "y"]), "expected x and y to be new");

        let items: HashSet<(String, String)> =
            s.items()?.map(|(k, v)| (k, v.to_string())).collect();
        let expected: HashSet<(String, String)> = [("x", "1"), ("y", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ensure!(items == expected, "unexpected items {:?}", items);

        s.refresh()?;
        bind(&frame, "_ignored", json!("krilin"));
        ensure!(s.diff()?.is_empty(), "nothing should be new after refresh");
        Ok(())
    })??;
    Ok(())
}

fn self_binding() -> Result<()> {
    let frame: Frame = shared(Locals::new());
    let _frame = enter_frame(frame.clone());

    let mut thing = ScopeTracker::<Locals<Value>>::new();
    thing.scope(|thing| -> Result<()> {
        bind(&frame, "thing", json!("<scope>"));
        ensure!(thing.diff()? == names(&["thing"]), "expected the tracker's own name");

        thing.refresh()?;
        bind(&frame, "_ignored", json!("krilin"));
        ensure!(thing.diff()?.is_empty(), "nothing should be new after refresh");
        Ok(())
    })??;
    Ok(())
}

fn self_binding_with_extras() -> Result<()> {
    let frame: Frame = shared(Locals::new());
    let _frame = enter_frame(frame.clone());

    let mut t = ScopeTracker::<Locals<Value>>::new().with_extras("t");
    t.scope(|t| -> Result<()> {
        bind(&frame, "t", json!("<scope>"));
        ensure!(t.diff()?.is_empty(), "extras should hide the tracker's name");
        Ok(())
    })??;
    Ok(())
}

fn underscore_included() -> Result<()> {
    let frame: Frame = shared(Locals::new());
    let _frame = enter_frame(frame.clone());

    let mut s = ScopeTracker::<Locals<Value>>::new().ignore_underscore(false);
    s.scope(|s| -> Result<()> {
        bind(&frame, "s", json!("<scope>"));
        bind(&frame, "_notignored", json!("plot"));
        ensure!(
            s.diff()? == names(&["s", "_notignored"]),
            "expected s and _notignored"
        );

        let items: Vec<(String, Value)> = s.items()?.collect();
        ensure!(
            items
                == vec![
                    ("s".to_string(), json!("<scope>")),
                    ("_notignored".to_string(), json!("plot"))
                ],
            "unexpected items {:?}",
            items
        );
        Ok(())
    })??;
    Ok(())
}
