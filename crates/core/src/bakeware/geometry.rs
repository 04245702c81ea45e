//! Pan geometry
//!
//! Exact volume formulas for each pan family. Every variant of [`PanConfig`]
//! carries exactly the dimensions its formula needs (centimeters), so volume
//! is always derivable once the dimensions are validated.
//!
//! | Family | Shape | Volume |
//! |---|---|---|
//! | round | cylinder | `π·(d/2)²·h` |
//! | square, rectangle, pullman, sheet | box | `l·w·h` |
//! | loaf, pound | trapezoidal prism | `((top+bottom)/2)·w·h` |
//! | chiffon | annulus | `round(outer,h) − round(inner,h)` |
//! | muffin | frustum per cup | `cups·π·h/12·(D² + D·d + d²)` |

use crate::core_types::units::CubicCentimeters;
use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Pan family tag (the closed set of supported bakeware)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanFamily {
    Round,
    Square,
    Rectangle,
    Loaf,
    Pullman,
    Pound,
    Chiffon,
    Muffin,
    Sheet,
}

impl PanFamily {
    /// Lowercase tag
    pub fn as_str(self) -> &'static str {
        match self {
            PanFamily::Round => "round",
            PanFamily::Square => "square",
            PanFamily::Rectangle => "rectangle",
            PanFamily::Loaf => "loaf",
            PanFamily::Pullman => "pullman",
            PanFamily::Pound => "pound",
            PanFamily::Chiffon => "chiffon",
            PanFamily::Muffin => "muffin",
            PanFamily::Sheet => "sheet",
        }
    }

    /// Dimension names in positional order for [`PanConfig::from_dimensions`]
    pub fn dimension_names(self) -> &'static [&'static str] {
        match self {
            PanFamily::Round => &["diameter", "height"],
            PanFamily::Square => &["side", "height"],
            PanFamily::Rectangle | PanFamily::Pullman | PanFamily::Sheet => {
                &["length", "width", "height"]
            }
            PanFamily::Loaf | PanFamily::Pound => {
                &["topLength", "bottomLength", "width", "height"]
            }
            PanFamily::Chiffon => &["outerDiameter", "innerDiameter", "height"],
            PanFamily::Muffin => &["topDiameter", "bottomDiameter", "height", "cups"],
        }
    }
}

impl FromStr for PanFamily {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "round" => Ok(PanFamily::Round),
            "square" => Ok(PanFamily::Square),
            "rectangle" | "rectangular" => Ok(PanFamily::Rectangle),
            "loaf" => Ok(PanFamily::Loaf),
            "pullman" => Ok(PanFamily::Pullman),
            "pound" => Ok(PanFamily::Pound),
            "chiffon" | "tube" => Ok(PanFamily::Chiffon),
            "muffin" => Ok(PanFamily::Muffin),
            "sheet" => Ok(PanFamily::Sheet),
            _ => Err(ConversionError::UnsupportedPanFamily(s.to_string())),
        }
    }
}

impl fmt::Display for PanFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bakeware with its family-specific dimensions (cm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PanConfig {
    Round {
        diameter: f64,
        height: f64,
    },
    Square {
        side: f64,
        height: f64,
    },
    Rectangle {
        length: f64,
        width: f64,
        height: f64,
    },
    /// Sloped-wall loaf tin
    Loaf {
        top_length: f64,
        bottom_length: f64,
        width: f64,
        height: f64,
    },
    /// Straight-walled lidded loaf tin
    Pullman {
        length: f64,
        width: f64,
        height: f64,
    },
    /// Pound cake tin (sloped walls)
    Pound {
        top_length: f64,
        bottom_length: f64,
        width: f64,
        height: f64,
    },
    /// Tube pan; the inner tube is subtracted
    Chiffon {
        outer_diameter: f64,
        inner_diameter: f64,
        height: f64,
    },
    /// Muffin tray of `cups` identical frustum-shaped cups
    Muffin {
        top_diameter: f64,
        bottom_diameter: f64,
        height: f64,
        cups: u32,
    },
    Sheet {
        length: f64,
        width: f64,
        height: f64,
    },
}

impl PanConfig {
    /// Round pan
    pub fn round(diameter: f64, height: f64) -> Self {
        PanConfig::Round { diameter, height }
    }

    /// Rectangular pan
    pub fn rectangle(length: f64, width: f64, height: f64) -> Self {
        PanConfig::Rectangle {
            length,
            width,
            height,
        }
    }

    /// Sloped-wall loaf tin
    pub fn loaf(top_length: f64, bottom_length: f64, width: f64, height: f64) -> Self {
        PanConfig::Loaf {
            top_length,
            bottom_length,
            width,
            height,
        }
    }

    /// Tube pan
    pub fn chiffon(outer_diameter: f64, inner_diameter: f64, height: f64) -> Self {
        PanConfig::Chiffon {
            outer_diameter,
            inner_diameter,
            height,
        }
    }

    /// Family tag of this pan
    pub fn family(&self) -> PanFamily {
        match self {
            PanConfig::Round { .. } => PanFamily::Round,
            PanConfig::Square { .. } => PanFamily::Square,
            PanConfig::Rectangle { .. } => PanFamily::Rectangle,
            PanConfig::Loaf { .. } => PanFamily::Loaf,
            PanConfig::Pullman { .. } => PanFamily::Pullman,
            PanConfig::Pound { .. } => PanFamily::Pound,
            PanConfig::Chiffon { .. } => PanFamily::Chiffon,
            PanConfig::Muffin { .. } => PanFamily::Muffin,
            PanConfig::Sheet { .. } => PanFamily::Sheet,
        }
    }

    /// Dimensions in [`PanFamily::dimension_names`] order
    pub fn dimensions(&self) -> Vec<f64> {
        match *self {
            PanConfig::Round { diameter, height } => vec![diameter, height],
            PanConfig::Square { side, height } => vec![side, height],
            PanConfig::Rectangle {
                length,
                width,
                height,
            }
            | PanConfig::Pullman {
                length,
                width,
                height,
            }
            | PanConfig::Sheet {
                length,
                width,
                height,
            } => vec![length, width, height],
            PanConfig::Loaf {
                top_length,
                bottom_length,
                width,
                height,
            }
            | PanConfig::Pound {
                top_length,
                bottom_length,
                width,
                height,
            } => vec![top_length, bottom_length, width, height],
            PanConfig::Chiffon {
                outer_diameter,
                inner_diameter,
                height,
            } => vec![outer_diameter, inner_diameter, height],
            PanConfig::Muffin {
                top_diameter,
                bottom_diameter,
                height,
                cups,
            } => vec![top_diameter, bottom_diameter, height, f64::from(cups)],
        }
    }

    /// Build a pan from a family tag and positional dimensions
    pub fn from_dimensions(family: PanFamily, dims: &[f64]) -> Result<Self> {
        let expected = family.dimension_names().len();
        if dims.len() != expected {
            return Err(ConversionError::DimensionCount {
                family: family.as_str(),
                expected,
                got: dims.len(),
            });
        }
        let pan = match family {
            PanFamily::Round => PanConfig::Round {
                diameter: dims[0],
                height: dims[1],
            },
            PanFamily::Square => PanConfig::Square {
                side: dims[0],
                height: dims[1],
            },
            PanFamily::Rectangle => PanConfig::Rectangle {
                length: dims[0],
                width: dims[1],
                height: dims[2],
            },
            PanFamily::Pullman => PanConfig::Pullman {
                length: dims[0],
                width: dims[1],
                height: dims[2],
            },
            PanFamily::Sheet => PanConfig::Sheet {
                length: dims[0],
                width: dims[1],
                height: dims[2],
            },
            PanFamily::Loaf => PanConfig::Loaf {
                top_length: dims[0],
                bottom_length: dims[1],
                width: dims[2],
                height: dims[3],
            },
            PanFamily::Pound => PanConfig::Pound {
                top_length: dims[0],
                bottom_length: dims[1],
                width: dims[2],
                height: dims[3],
            },
            PanFamily::Chiffon => PanConfig::Chiffon {
                outer_diameter: dims[0],
                inner_diameter: dims[1],
                height: dims[2],
            },
            PanFamily::Muffin => {
                let cups = dims[3];
                if cups < 1.0 || cups.fract() != 0.0 || cups > f64::from(u32::MAX) {
                    return Err(ConversionError::InvalidPanDimension {
                        dimension: "cups",
                        value: cups,
                    });
                }
                PanConfig::Muffin {
                    top_diameter: dims[0],
                    bottom_diameter: dims[1],
                    height: dims[2],
                    cups: cups as u32,
                }
            }
        };
        pan.validate()?;
        Ok(pan)
    }

    /// Check every dimension is finite and positive, and the tube fits inside
    /// a chiffon pan
    pub fn validate(&self) -> Result<()> {
        let family = self.family();
        for (&name, value) in family.dimension_names().iter().zip(self.dimensions()) {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConversionError::InvalidPanDimension {
                    dimension: name,
                    value,
                });
            }
        }
        if let PanConfig::Chiffon {
            outer_diameter,
            inner_diameter,
            ..
        } = *self
        {
            if inner_diameter >= outer_diameter {
                return Err(ConversionError::InvalidPanDimension {
                    dimension: "innerDiameter",
                    value: inner_diameter,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for PanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self
            .dimensions()
            .iter()
            .map(|d| format!("{d}"))
            .collect();
        write!(f, "{} {}", self.family(), dims.join("×"))
    }
}

/// Cylinder volume from diameter and height
#[inline]
fn cylinder(diameter: f64, height: f64) -> f64 {
    PI * (diameter / 2.0).powi(2) * height
}

/// Volume of a pan
pub fn volume(pan: &PanConfig) -> Result<CubicCentimeters> {
    pan.validate()?;
    let cc = match *pan {
        PanConfig::Round { diameter, height } => cylinder(diameter, height),
        PanConfig::Square { side, height } => side * side * height,
        PanConfig::Rectangle {
            length,
            width,
            height,
        }
        | PanConfig::Pullman {
            length,
            width,
            height,
        }
        | PanConfig::Sheet {
            length,
            width,
            height,
        } => length * width * height,
        PanConfig::Loaf {
            top_length,
            bottom_length,
            width,
            height,
        }
        | PanConfig::Pound {
            top_length,
            bottom_length,
            width,
            height,
        } => (top_length + bottom_length) / 2.0 * width * height,
        PanConfig::Chiffon {
            outer_diameter,
            inner_diameter,
            height,
        } => cylinder(outer_diameter, height) - cylinder(inner_diameter, height),
        PanConfig::Muffin {
            top_diameter,
            bottom_diameter,
            height,
            cups,
        } => {
            let frustum = PI * height / 12.0
                * (top_diameter.powi(2)
                    + top_diameter * bottom_diameter
                    + bottom_diameter.powi(2));
            frustum * f64::from(cups)
        }
    };
    Ok(CubicCentimeters::new(cc))
}

/// Factor that converts a recipe for `source` into one for `target`
pub fn scaling_factor(source: &PanConfig, target: &PanConfig) -> Result<f64> {
    Ok(volume(target)? / volume(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_pan_volume() {
        let v = volume(&PanConfig::round(18.0, 5.0)).unwrap();
        assert_relative_eq!(*v, PI * 81.0 * 5.0);
        assert!((*v - 1272.3).abs() < 0.05);
    }

    #[test]
    fn test_box_families() {
        assert_relative_eq!(
            *volume(&PanConfig::Square { side: 20.0, height: 5.0 }).unwrap(),
            2000.0
        );
        assert_relative_eq!(*volume(&PanConfig::rectangle(30.0, 20.0, 4.0)).unwrap(), 2400.0);
        assert_relative_eq!(
            *volume(&PanConfig::Pullman {
                length: 20.0,
                width: 10.0,
                height: 10.0
            })
            .unwrap(),
            2000.0
        );
    }

    #[test]
    fn test_loaf_trapezoid() {
        let v = volume(&PanConfig::loaf(22.0, 20.0, 10.0, 7.0)).unwrap();
        assert_relative_eq!(*v, 21.0 * 10.0 * 7.0);
    }

    #[test]
    fn test_chiffon_subtracts_tube() {
        let v = volume(&PanConfig::chiffon(20.0, 8.0, 9.0)).unwrap();
        let expected = PI * 100.0 * 9.0 - PI * 16.0 * 9.0;
        assert_relative_eq!(*v, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_muffin_cylinder_when_diameters_match() {
        let v = volume(&PanConfig::Muffin {
            top_diameter: 6.0,
            bottom_diameter: 6.0,
            height: 3.0,
            cups: 12,
        })
        .unwrap();
        assert_relative_eq!(*v, cylinder(6.0, 3.0) * 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert_eq!(
            volume(&PanConfig::round(0.0, 5.0)),
            Err(ConversionError::InvalidPanDimension {
                dimension: "diameter",
                value: 0.0
            })
        );
        assert!(volume(&PanConfig::chiffon(10.0, 12.0, 5.0)).is_err());
        assert!(volume(&PanConfig::rectangle(10.0, f64::NAN, 5.0)).is_err());
    }

    #[test]
    fn test_scaling_factor_round_pans() {
        // 18cm -> 21cm round, same height: (21/18)^2
        let f = scaling_factor(&PanConfig::round(18.0, 5.0), &PanConfig::round(21.0, 5.0)).unwrap();
        assert_relative_eq!(f, (21.0_f64 / 18.0).powi(2), epsilon = 1e-12);
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("Chiffon".parse::<PanFamily>(), Ok(PanFamily::Chiffon));
        assert_eq!(
            "bundt".parse::<PanFamily>(),
            Err(ConversionError::UnsupportedPanFamily("bundt".into()))
        );
    }

    #[test]
    fn test_from_dimensions_round_trips() {
        let pan = PanConfig::from_dimensions(PanFamily::Loaf, &[22.0, 20.0, 10.0, 7.0]).unwrap();
        assert_eq!(pan, PanConfig::loaf(22.0, 20.0, 10.0, 7.0));
        assert_eq!(pan.dimensions(), vec![22.0, 20.0, 10.0, 7.0]);

        assert_eq!(
            PanConfig::from_dimensions(PanFamily::Round, &[18.0]),
            Err(ConversionError::DimensionCount {
                family: "round",
                expected: 2,
                got: 1
            })
        );
        assert!(PanConfig::from_dimensions(PanFamily::Muffin, &[6.0, 5.0, 3.0, 2.5]).is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(PanConfig::chiffon(20.0, 8.0, 9.0)).unwrap();
        assert_eq!(json["family"], "chiffon");
        assert_eq!(json["outerDiameter"], 20.0);
    }
}
