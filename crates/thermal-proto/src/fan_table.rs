//! Textual fan-curve format
//!
//! A curve is written as eight `<temperature>c:<duty>%` points separated by
//! commas, e.g. `39c:0%,49c:0%,59c:0%,69c:0%,79c:31%,89c:49%,99c:56%,109c:56%`.
//! On the wire the same curve is 16 bytes: the eight temperatures followed by
//! the eight duty percentages.

use std::fmt;
use thiserror::Error;

use crate::FanTable;

/// Number of points in a fan curve
pub const FAN_CURVE_POINTS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FanCurveError {
    #[error("expected 8 points, got {0}")]
    PointCount(usize),

    #[error("malformed point '{0}', expected <temp>c:<duty>%")]
    MalformedPoint(String),

    #[error("fan duty {0}% exceeds 100%")]
    DutyOutOfRange(u8),

    #[error("temperature {current}c at point {index} is below the previous point ({previous}c)")]
    TemperatureOrder {
        index: usize,
        previous: u8,
        current: u8,
    },
}

impl FanTable {
    /// Parse a curve from its textual form.
    pub fn parse(text: &str) -> Result<Self, FanCurveError> {
        let points: Vec<&str> = text
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if points.len() != FAN_CURVE_POINTS {
            return Err(FanCurveError::PointCount(points.len()));
        }

        let mut curve = vec![0u8; FAN_CURVE_POINTS * 2];
        let mut previous: Option<u8> = None;

        for (index, point) in points.iter().enumerate() {
            let (temperature, duty) = parse_point(point)?;

            if let Some(previous) = previous {
                if temperature < previous {
                    return Err(FanCurveError::TemperatureOrder {
                        index,
                        previous,
                        current: temperature,
                    });
                }
            }
            previous = Some(temperature);

            curve[index] = temperature;
            curve[index + FAN_CURVE_POINTS] = duty;
        }

        Ok(Self { curve })
    }

    /// A table is usable only with exactly 16 bytes
    pub fn is_valid(&self) -> bool {
        self.curve.len() == FAN_CURVE_POINTS * 2
    }

    /// `(temperature, duty)` pairs; empty when the table is not valid.
    pub fn points(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        let (temperatures, duties) = if self.is_valid() {
            self.curve.split_at(FAN_CURVE_POINTS)
        } else {
            (&[][..], &[][..])
        };
        temperatures.iter().copied().zip(duties.iter().copied())
    }
}

fn parse_point(point: &str) -> Result<(u8, u8), FanCurveError> {
    let malformed = || FanCurveError::MalformedPoint(point.to_string());

    let (temperature, duty) = point.split_once(':').ok_or_else(malformed)?;
    let temperature = temperature
        .trim()
        .strip_suffix(|c: char| c == 'c' || c == 'C')
        .ok_or_else(malformed)?;
    let duty = duty.trim().strip_suffix('%').ok_or_else(malformed)?;

    let temperature: u8 = temperature.trim().parse().map_err(|_| malformed())?;
    let duty: u8 = duty.trim().parse().map_err(|_| malformed())?;

    if duty > 100 {
        return Err(FanCurveError::DutyOutOfRange(duty));
    }

    Ok((temperature, duty))
}

impl fmt::Display for FanTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (temperature, duty)) in self.points().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}c:{}%", temperature, duty)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for FanTable {
    type Err = FanCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FanTable {
    type Error = FanCurveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FanTable> for String {
    fn from(table: FanTable) -> Self {
        table.to_string()
    }
}
