use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use calendar::HebrewCalendar;
use chrono::{TimeDelta, TimeZone, Utc};
use clock_core::{
    load_settings, ClockService, DisplayModel, DisplayZone, DriftCorrectedScheduler,
    ManualTimeSource, NotificationSink, RenderSink, TimeSource, LOADING_TEXT,
};
use shared::{
    domain::{HebrewDateFormat, TimeFormat},
    protocol::ClockNotification,
};

#[derive(Default)]
struct Frames(Vec<DisplayModel>);

impl RenderSink for Frames {
    fn present(&mut self, model: &DisplayModel) {
        self.0.push(model.clone());
    }
}

#[derive(Default)]
struct Signals(Vec<ClockNotification>);

impl NotificationSink for Signals {
    fn notify(&mut self, notification: ClockNotification) {
        self.0.push(notification);
    }
}

fn write_config(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
    fs::write(&path, body).expect("write config");
    path
}

#[test]
fn config_file_drives_display_settings() {
    let path = write_config(
        "clock-config",
        r#"
time_format = 12

[clock]
show_period = true
hebrew_date_format = "dayOnly"
timezone = "Asia/Jerusalem"

[worker]
request_timeout_ms = 750
"#,
    );

    let settings = load_settings(&path).expect("settings");
    fs::remove_file(&path).ok();

    let display = settings.display_config();
    assert_eq!(display.time_format, TimeFormat::H12);
    assert!(display.show_period);
    assert_eq!(display.hebrew_date_format, HebrewDateFormat::DayOnly);
    assert_eq!(settings.request_timeout(), Duration::from_millis(750));
}

#[test]
fn invalid_timezone_in_file_is_rejected() {
    let path = write_config(
        "clock-bad-zone",
        r#"
[clock]
timezone = "Nowhere/Special"
"#,
    );

    let err = load_settings(&path).expect_err("invalid timezone");
    fs::remove_file(&path).ok();
    assert!(err.to_string().contains("Nowhere/Special"), "{err}");
}

#[test]
fn scheduled_ticks_stay_on_boundaries_for_an_hour() {
    let start = Utc
        .with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
        .single()
        .expect("instant")
        + TimeDelta::milliseconds(640);
    let time = Arc::new(ManualTimeSource::new(start));
    let zone = DisplayZone::parse(Some("UTC")).expect("zone");
    let mut scheduler = DriftCorrectedScheduler::new(time.clone(), zone, true);

    for step in 0..3_600u64 {
        let delay = scheduler.next_delay();
        // Callback and timer lateness vary a little on every tick.
        time.advance(delay + Duration::from_millis(step % 37));
        let tick = scheduler.fire();
        let millis = tick.at.timestamp_subsec_millis();
        assert!(
            (50..=86).contains(&millis),
            "tick {step} landed {millis}ms past the boundary"
        );
    }

    let elapsed = time.now() - start;
    assert!(elapsed.num_seconds() >= 3_599 && elapsed.num_seconds() <= 3_601);
}

#[tokio::test(start_paused = true)]
async fn service_renders_loading_then_hebrew_date() {
    let path = write_config(
        "clock-service",
        r#"
[clock]
display_seconds = true
send_notifications = true
timezone = "UTC"
"#,
    );
    let settings = load_settings(&path).expect("settings");
    fs::remove_file(&path).ok();

    let time = Arc::new(ManualTimeSource::new(
        Utc.with_ymd_and_hms(2024, 3, 24, 18, 30, 0)
            .single()
            .expect("instant"),
    ));
    let service =
        ClockService::new(&settings, time, Arc::new(HebrewCalendar)).expect("service");
    let mut frames = Frames::default();
    let mut signals = Signals::default();

    service
        .run(
            &mut frames,
            &mut signals,
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await
        .expect("run");

    assert_eq!(
        frames.0.first().and_then(|m| m.hebrew_date_text.as_deref()),
        Some(LOADING_TEXT)
    );
    assert_eq!(
        frames.0.last().and_then(|m| m.hebrew_date_text.as_deref()),
        Some("י״ד אדר ב׳ תשפ״ד")
    );
    assert!(signals.0.is_empty(), "no boundary crossed yet");
}
