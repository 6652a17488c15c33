//! Value parsers for command-line arguments.

#[cfg(test)]
#[path = "args_test.rs"]
mod args_test;

/// A pixel position given as `X,Y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelArg {
    pub x: f64,
    pub y: f64,
}

/// An on-screen canvas size given as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasArg {
    pub width: f64,
    pub height: f64,
}

pub fn parse_pixel(raw: &str) -> Result<PixelArg, String> {
    let (x, y) = split_pair(raw, ',')?;
    Ok(PixelArg { x, y })
}

pub fn parse_canvas(raw: &str) -> Result<CanvasArg, String> {
    let (width, height) = split_pair(&raw.to_ascii_lowercase(), 'x')?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("canvas size must be positive, got {raw:?}"));
    }
    Ok(CanvasArg { width, height })
}

/// A fraction of the logical canvas, in `[0, 1]`.
pub fn parse_fraction(raw: &str) -> Result<f64, String> {
    let value = parse_number(raw)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("fraction must be between 0 and 1, got {value}"))
    }
}

fn split_pair(raw: &str, sep: char) -> Result<(f64, f64), String> {
    let (a, b) = raw.split_once(sep).ok_or_else(|| format!("expected two numbers separated by '{sep}', got {raw:?}"))?;
    Ok((parse_number(a)?, parse_number(b)?))
}

fn parse_number(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|_| format!("not a number: {raw:?}"))?;
    if value.is_finite() { Ok(value) } else { Err(format!("not a finite number: {raw:?}")) }
}
