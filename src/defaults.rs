//! Central place for all default values.
//! Update these and the whole app picks them up.

pub struct Defaults;

impl Defaults {

    /* Verification service */
    pub const API_URL: &'static str = "http://127.0.0.1:8080";
    pub const TIMEOUT_SECS: u64 = 30;

    /* Camera streamer (ffmpeg keeps overwriting one JPEG) */
    pub const STREAMER_PROGRAM: &'static str = "ffmpeg";
    pub const STREAMER_ARGS: &'static [&'static str] = &[
        "-loglevel", "error",
        "-f", "v4l2",
        "-i", "{device}",
        "-vf", "fps=5",
        "-update", "1",
        "-y", "{output}",
    ];
    pub const ENVIRONMENT_DEVICE: &'static str = "/dev/video0";
    pub const FIRST_FRAME_TIMEOUT_MS: u64 = 5_000;

    /* Country selection */
    pub const COUNTRY_ADVANCE_DELAY_MS: u64 = 300;

    /* Logging */
    pub const LOG_FILE: &'static str = "./kyc-wizard.log";
    pub const LOG_FILTER: &'static str = "info";

    /* Headless submit: how long to wait for the OCR call before exiting */
    pub const OCR_DRAIN_SECS: u64 = 10;
}
