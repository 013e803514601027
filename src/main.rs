//! Skyglow firmware main entry point.
//!
//! Wires the ESP32 peripherals into a [`Board`] and hands it to the
//! monitor service, which runs until a fault escapes a cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RangedSource      TrafficLight /   HeartbeatLed   Watchdog    │
//! │  (I2C light sensor) MatrixDisplay   (GPIO)         (TWDT)      │
//! │  SystemClock · FreeRtos delay · LogEventSink · FileRecordSink  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  ReadSupervisor · FSM · Pipeline · CycleTimer          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two board builds:
//! - default: VEML7700 + three discrete LEDs, lux domain;
//! - `matrix-display`: TSL2591 + 8x8 WS2812 matrix, SQM domain.

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use skyglow::adapters::log_sink::LogEventSink;
use skyglow::adapters::record_file::FileRecordSink;
use skyglow::adapters::time::SystemClock;
use skyglow::app::ports::Board;
use skyglow::app::service::MonitorService;
use skyglow::config::{DIAGNOSTIC_RECORD_PATH, MonitorConfig};
use skyglow::diagnostics::{self, FaultRecord};
use skyglow::drivers::heartbeat::HeartbeatLed;
use skyglow::drivers::watchdog::Watchdog;
use skyglow::pins;
use skyglow::sensors::bus::I2cRegisterBus;
use skyglow::sensors::source::RangedSource;

#[cfg(feature = "matrix-display")]
use skyglow::drivers::{
    matrix::{MatrixDisplay, Wiring},
    ws2812::RmtPixelWriter,
};
#[cfg(feature = "matrix-display")]
use skyglow::sensors::tsl2591::{self, Tsl2591};

#[cfg(not(feature = "matrix-display"))]
use skyglow::drivers::traffic_light::TrafficLight;
#[cfg(not(feature = "matrix-display"))]
use skyglow::sensors::veml7700::{self, Veml7700};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Skyglow v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = mount_record_fs() {
        warn!("SPIFFS mount failed ({}), fault records will be dropped", e);
    }
    diagnostics::install_panic_handler();

    // ── 2. Configuration ──────────────────────────────────────
    let config = board_config();
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config dump failed: {}", e),
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once here.
    let (sda, scl, heartbeat_pin) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
            AnyOutputPin::new(pins::HEARTBEAT_GPIO),
        )
    };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;

    #[cfg(feature = "matrix-display")]
    let (source, indicator) = {
        let sensor = Tsl2591::new(I2cRegisterBus::new(i2c, tsl2591::ADDRESS), config.lux_df);
        // SAFETY: see above.
        let data = unsafe { AnyOutputPin::new(pins::MATRIX_DATA_GPIO) };
        let writer = RmtPixelWriter::new(peripherals.rmt.channel0, data)?;
        (
            RangedSource::new(sensor, &config),
            MatrixDisplay::new(writer, config.display, Wiring::Serpentine),
        )
    };

    #[cfg(not(feature = "matrix-display"))]
    let (source, indicator) = {
        let sensor = Veml7700::new(I2cRegisterBus::new(i2c, veml7700::ADDRESS));
        // SAFETY: see above.
        let (green, yellow, red) = unsafe {
            (
                AnyOutputPin::new(pins::LED_GREEN_GPIO),
                AnyOutputPin::new(pins::LED_YELLOW_GPIO),
                AnyOutputPin::new(pins::LED_RED_GPIO),
            )
        };
        (
            RangedSource::new(sensor, &config),
            TrafficLight::new(
                PinDriver::output(green)?,
                PinDriver::output(yellow)?,
                PinDriver::output(red)?,
            ),
        )
    };

    let mut board = Board {
        source,
        indicator,
        heartbeat: HeartbeatLed::new(PinDriver::output(heartbeat_pin)?),
        watchdog: Watchdog::new(config.watchdog_timeout_secs),
        clock: SystemClock::new(),
        delay: FreeRtos,
    };

    // ── 4. Run ────────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service = MonitorService::new(config);
    info!("System ready. Entering monitor loop.");

    let Err(fault) = service.run(&mut board, &mut sink);

    // ── 5. Top-level fault: record once, then halt ────────────
    error!("Unrecoverable fault: {}, halting", fault);
    let record = FaultRecord::from_display(board.clock.uptime_secs(), &fault);
    diagnostics::record_fault(&mut FileRecordSink::new(DIAGNOSTIC_RECORD_PATH), &record);

    // The watchdog is no longer fed; it resets the chip.
    loop {
        FreeRtos::delay_ms(1000);
    }
}

/// Preset for this board build, validated once.
fn board_config() -> MonitorConfig {
    #[cfg(feature = "matrix-display")]
    let config = MonitorConfig::sqm();
    #[cfg(not(feature = "matrix-display"))]
    let config = MonitorConfig::lux();

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Invalid config ({}), using defaults", e);
            MonitorConfig::default()
        }
    }
}

/// Mount the SPIFFS partition that holds the diagnostic record.
fn mount_record_fs() -> Result<(), esp_idf_svc::sys::EspError> {
    use esp_idf_svc::sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 2,
        format_if_mount_failed: true,
    };
    // SAFETY: `conf` outlives the call; the VFS copies what it keeps.
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })
}
