//! todomaster settings commands.

use chrono::Utc;

use crate::cli::{push_notices, unexpected, Context};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::settings::{Settings, SettingsUpdate};
use crate::store::{Action, Outcome};

pub struct SetOptions {
    pub key: String,
    pub value: String,
    pub ctx: Context,
}

pub fn run_show(ctx: Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let settings = store.settings().clone();

    let mut human = HumanOutput::new("Settings");
    push_notices(&mut human, &mut store);
    push_settings(&mut human, &settings);

    emit_success(ctx.output, "settings show", &settings, Some(&human))
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let update = SettingsUpdate::from_key_value(&options.key, &options.value)?;
    let mut store = options.ctx.open_store()?;
    let outcome = store.apply(Action::UpdateSettings(update), Utc::now())?;
    let Outcome::SettingsUpdated { settings } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!("Updated {}", options.key));
    push_notices(&mut human, &mut store);
    push_settings(&mut human, settings);

    emit_success(options.ctx.output, "settings set", settings, Some(&human))
}

fn push_settings(human: &mut HumanOutput, settings: &Settings) {
    human.push_summary("filter", settings.filter.as_str());
    human.push_summary("theme", settings.theme.to_string());
    human.push_summary(
        "archive-on-complete",
        settings.archive_on_complete.to_string(),
    );
    human.push_summary("notifications", settings.notifications.to_string());
}
