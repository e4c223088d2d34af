use anyhow::Result;
use chrono::Local;
use homedash_ui::text::{render_month, render_panel};
use homedash_ui::CalendarPageModel;

fn main() -> Result<()> {
    homedash_core::init()?;

    let mut app = homedash_core::App::new()?;
    app.initialize()?;
    tracing::info!("Homedash started");

    let today = Local::now().date_naive();
    let mut page = CalendarPageModel::open(app.config(), today)?;
    page.load();

    println!("{}", render_month(&page.grid(today)));
    println!("{}", render_panel(&page.selected_panel()));
    if !page.flash().is_empty() {
        println!("{}", page.flash());
    }

    app.shutdown()?;
    Ok(())
}
