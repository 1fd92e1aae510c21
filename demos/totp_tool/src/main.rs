use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use clap::Parser;
use qrcode::{Color, QrCode};

use termtotp::{
    render::{GlyphRenderer, ModuleMatrix, RenderError},
    secret,
    totp::{Totp, DRIFT_WINDOW_OFFSETS},
    Otp,
};

/// Manipulate TOTP-based two-factor authorisation codes.
///
/// Either provide an existing seed or use --new to generate one. The
/// current check code is printed; --extra-codes adds the two codes on
/// either side of it, in case clocks are out of sync. --draw prints the
/// provisioning QR code with half-block glyphs, or at 2x scale with
/// --upscale.
#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    /// Use an existing token (or use --new)
    token: Option<String>,

    /// Generate a new token (or provide a token)
    #[clap(short, long)]
    new: bool,

    /// Also generate the two previous codes and the two next codes
    #[clap(short = 'x', long)]
    extra_codes: bool,

    /// Draw a QR code of the token
    #[clap(short, long)]
    draw: bool,

    /// Draw at 2x scale
    #[clap(long)]
    upscale: bool,

    /// The username to be encoded in the QR code
    #[clap(long, value_name = "user", default_value = "user@example.com")]
    qr_user: String,

    /// The issuer to be encoded in the QR code
    #[clap(long, value_name = "issuer", default_value = "Example Corp")]
    qr_issuer: String,
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let seed = match (&args.token, args.new) {
        (Some(_), true) => bail!("Either specify a token or use --new/-n, but not both"),
        (None, false) => bail!("No arguments provided. Call with --help for operating instructions"),
        (Some(token), false) => token.clone(),
        (None, true) => secret::generate_default()?,
    };

    println!("Using the TOTP seed: {seed}");

    let totp = Totp::new(seed);
    let now = Local::now().timestamp() as u64;

    let offsets: &[i64] = if args.extra_codes {
        &DRIFT_WINDOW_OFFSETS
    } else {
        &[0]
    };

    for entry in totp.codes_at_offsets(now, offsets)? {
        let instant = DateTime::from_timestamp(entry.seconds_since_epoch as i64, 0)
            .context("instant out of range")?
            .with_timezone(&Local);

        println!(
            "At {}, the check code is: {}",
            instant.format("%H:%M:%S"),
            entry.code
        );
    }

    if args.draw {
        let uri = totp.to_uri(&args.qr_user, &args.qr_issuer)?;
        let qrc = QrCode::new(uri.as_bytes())?;
        let matrix = qr_to_matrix(&qrc)?;

        let renderer = GlyphRenderer::new();
        let buffer = if args.upscale {
            renderer.render_full(&matrix)
        } else {
            renderer.render_half(&matrix)
        };

        println!();
        for line in &buffer {
            println!("{line}");
        }
        println!();
    }

    Ok(())
}

/// Adapts the QR encoder's flat color buffer to the renderer's row-based
/// matrix.
fn qr_to_matrix(qrc: &QrCode) -> Result<ModuleMatrix, RenderError> {
    let width = qrc.width();

    let rows = qrc
        .to_colors()
        .chunks(width)
        .map(|row| row.iter().map(|color| *color == Color::Dark).collect())
        .collect();

    ModuleMatrix::from_rows(rows)
}
