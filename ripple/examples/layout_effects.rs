//! Example: layout and paint effects driven by tracked values.
//!
//! Two components register effects in a `layout` and a `paint` phase. The
//! effects read tracked values, so later commits only re-run the effects
//! whose inputs changed. Destroying a component tears its effects down.
//!
//! Run with: `RUST_LOG=debug cargo run --example layout_effects -p ripple`

use ripple::prelude::*;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = Runtime::new();
    let width = Rc::new(runtime.tracked(320u32));
    let color = Rc::new(runtime.tracked("black".to_string()));

    let config = ManagerConfig::default().with_phases(PhaseOrder::new(["layout", "paint"])?);
    let manager = EffectManager::builder(runtime.clone())
        .config(config)
        .scheduler(|phase: &Phase, revalidate: Revalidate| {
            tracing::info!(phase = %phase, "flushing phase");
            revalidate.run()
        })
        .build();

    let sidebar = Owner::named("sidebar");
    let header = Owner::named("header");

    manager.transaction(|m| {
        let w = Rc::clone(&width);
        let w2 = Rc::clone(&width);
        m.register_owned(
            &sidebar,
            "layout",
            fn_hooks(
                move || {
                    println!("sidebar: measure at {}px", w.get());
                    Ok(())
                },
                move || {
                    println!("sidebar: re-measure at {}px", w2.get());
                    Ok(())
                },
                || {
                    println!("sidebar: release layout");
                    Ok(())
                },
            ),
        )?;

        let c = Rc::clone(&color);
        let c2 = Rc::clone(&color);
        m.register_owned(
            &header,
            "paint",
            fn_hooks(
                move || {
                    println!("header: paint {}", c.get());
                    Ok(())
                },
                move || {
                    println!("header: repaint {}", c2.get());
                    Ok(())
                },
                || {
                    println!("header: clear");
                    Ok(())
                },
            ),
        )
    })?;

    // Only the sidebar reads the width, so only its layout effect updates.
    width.set(480);
    manager.transaction(|_| Ok(()))?;

    // Nothing changed: neither effect runs.
    manager.transaction(|_| Ok(()))?;

    color.set("teal".to_string());
    manager.transaction(|_| Ok(()))?;

    sidebar.destroy()?;
    header.destroy()?;
    println!(
        "live effects: layout={} paint={}",
        manager.len("layout")?,
        manager.len("paint")?
    );
    Ok(())
}
