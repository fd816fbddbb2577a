//! Nested Locator Demo - Page-Object Schema Resolution
//!
//! Demonstrates registering a locator schema hierarchy, customizing a
//! per-test snapshot, and resolving composed queries.
//!
//! # Running
//!
//! ```bash
//! cargo run --example nested_locator_demo -p ubicar
//! ```

#![allow(clippy::unwrap_used)]

use ubicar::{
    AriaRole, LocatorFilter, LocatorStore, LogLevel, RoleOptions, SchemaDef, SchemaUpdate,
};

fn main() -> ubicar::UbicarResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Ubicar Nested Locator Demo ===\n");

    let store = build_login_page()?;

    demo_plain_resolution(&store)?;
    demo_customized_snapshot(&store)?;
    demo_frame_boundary(&store)?;
    demo_report(&store);

    println!("\n=== Demo Complete ===");
    Ok(())
}

/// Register the schema hierarchy once, the way a page object's constructor
/// would.
fn build_login_page() -> ubicar::UbicarResult<LocatorStore> {
    let mut store = LocatorStore::with_log_level("LoginPage", LogLevel::Debug);

    store.add_schema("body", SchemaDef::css(".login"))?;
    store.add_schema(
        "body.form",
        SchemaDef::css("form").with_filter(LocatorFilter::new().has_text("Sign in")),
    )?;
    store.add_schema(
        "body.form.button",
        SchemaDef::role(AriaRole::Button).with_role_options(RoleOptions::named("Login")),
    )?;
    store.add_schema("body.consent", SchemaDef::frame("#consent"))?;
    store.add_schema(
        "body.consent.accept",
        SchemaDef::role(AriaRole::Button).with_role_options(RoleOptions::named("Accept")),
    )?;

    Ok(store)
}

fn demo_plain_resolution(store: &LocatorStore) -> ubicar::UbicarResult<()> {
    println!("--- Demo 1: Plain Resolution ---\n");

    let query = store.resolve("body.form.button")?.get_nested_locator()?;
    println!("body.form.button resolves to:\n  {}\n", query.to_expression());
    Ok(())
}

fn demo_customized_snapshot(store: &LocatorStore) -> ubicar::UbicarResult<()> {
    println!("--- Demo 2: Per-Test Customization ---\n");

    let query = store
        .resolve("body.form.button")?
        .update(
            "body.form.button",
            SchemaUpdate::new().role_options(RoleOptions::named("Sign in")),
        )?
        .add_filter("body.form", LocatorFilter::new().has_not_text("Register"))?
        .get_nested_locator()?;
    println!("customized snapshot resolves to:\n  {}", query.to_expression());

    // the registry is untouched
    let pristine = store.resolve("body.form.button")?.get_nested_locator()?;
    println!("a fresh snapshot still resolves to:\n  {}\n", pristine.to_expression());
    Ok(())
}

fn demo_frame_boundary(store: &LocatorStore) -> ubicar::UbicarResult<()> {
    println!("--- Demo 3: Iframe Boundary ---\n");

    let query = store.resolve("body.consent.accept")?.get_nested_locator()?;
    println!(
        "descendants of the frame resolve inside it:\n  {}\n",
        query.to_expression()
    );
    Ok(())
}

fn demo_report(store: &LocatorStore) {
    println!("--- Demo 4: Report Log ---\n");
    println!("{}", store.logger().render_report());
}
