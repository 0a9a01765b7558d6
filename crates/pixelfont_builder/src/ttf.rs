use crate::trace::{correct_direction, trace, Contour};
use anyhow::anyhow;
use image::GrayImage;
use kurbo::BezPath;
use log::{debug, warn};
use pixelfont_interface::assembler::{FontAssembler, FontNames, GlyphImages};
use pixelfont_shared::types::{Error, Point, Result};
use write_fonts::tables::cmap::Cmap;
use write_fonts::tables::glyf::{GlyfLocaBuilder, Glyph, SimpleGlyph};
use write_fonts::tables::head::Head;
use write_fonts::tables::hhea::Hhea;
use write_fonts::tables::hmtx::{Hmtx, LongMetric};
use write_fonts::tables::loca::LocaFormat;
use write_fonts::tables::maxp::Maxp;
use write_fonts::tables::name::{Name, NameRecord};
use write_fonts::tables::os2::Os2;
use write_fonts::tables::post::Post;
use write_fonts::types::{FWord, Fixed, GlyphId, NameId, UfWord};
use write_fonts::FontBuilder;

pub const LOG_TARGET: &str = "builder";

/// Maps canvas pixels onto the em square. The canvas spans the whole em: its top edge is
/// the ascender, its bottom edge the descender.
#[derive(Clone, Copy, Debug)]
struct EmGrid {
    units_per_em: u16,
    scale: f64,
    ascent: i16,
    descent: i16,
}

impl EmGrid {
    fn new(units_per_em: u16, image_size: u32) -> Self {
        let descent = (units_per_em / 5) as i16;
        Self {
            units_per_em,
            scale: f64::from(units_per_em) / f64::from(image_size),
            ascent: units_per_em as i16 - descent,
            descent,
        }
    }

    fn to_font(self, p: Point<i32>) -> (f64, f64) {
        (
            (f64::from(p.x) * self.scale).round(),
            (f64::from(self.ascent) - f64::from(p.y) * self.scale).round(),
        )
    }
}

/// Font-unit bounds of one glyph
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Bounds {
    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// A traced glyph ready to be written
struct OutlineGlyph {
    name: String,
    glyph: Glyph,
    bounds: Option<Bounds>,
    points: usize,
    contours: usize,
}

/// Writes traced glyph images as a TrueType font. Every glyph has the same advance, the
/// width of the canvas.
pub struct TrueTypeAssembler {
    image_size: u32,
    units_per_em: u16,
    threshold: u8,
}

impl TrueTypeAssembler {
    pub fn new(image_size: u32, units_per_em: u16, threshold: u8) -> Self {
        Self {
            image_size,
            units_per_em,
            threshold,
        }
    }

    /// Traces an image into contours with TrueType winding
    pub fn outline(&self, image: &GrayImage) -> Vec<Contour> {
        let mut contours = trace(image, self.threshold);
        correct_direction(&mut contours);
        contours
    }

    fn glyph(&self, grid: EmGrid, code_point: u32, image: &GrayImage) -> Result<OutlineGlyph> {
        let contours = self.outline(image);
        let name = format!("uni{code_point:04X}");

        if contours.is_empty() {
            return Ok(OutlineGlyph {
                name,
                glyph: Glyph::Empty,
                bounds: None,
                points: 0,
                contours: 0,
            });
        }

        let mut path = BezPath::new();
        let mut bounds: Option<Bounds> = None;

        for contour in &contours {
            for (i, &point) in contour.points.iter().enumerate() {
                let (x, y) = grid.to_font(point);
                if i == 0 {
                    path.move_to((x, y));
                } else {
                    path.line_to((x, y));
                }

                let b = Bounds {
                    x_min: x,
                    y_min: y,
                    x_max: x,
                    y_max: y,
                };
                bounds = Some(bounds.map_or(b, |acc| acc.union(b)));
            }
            path.close_path();
        }

        let simple = SimpleGlyph::from_bezpath(&path)
            .map_err(|err| anyhow!("unable to convert outline of {name}: {err:?}"))?;

        debug!(target: LOG_TARGET, "{name}: {} contours", contours.len());
        Ok(OutlineGlyph {
            name,
            glyph: Glyph::Simple(simple),
            bounds,
            points: contours.iter().map(|c| c.points.len()).sum(),
            contours: contours.len(),
        })
    }

    fn names_table(names: &FontNames) -> Name {
        let records = [
            (NameId::FAMILY_NAME, names.family_name.clone()),
            (NameId::SUBFAMILY_NAME, "Regular".to_string()),
            (NameId::UNIQUE_ID, format!("{};Regular", names.font_name)),
            (NameId::FULL_NAME, names.full_name.clone()),
            (NameId::VERSION_STRING, "Version 1.000".to_string()),
            (NameId::POSTSCRIPT_NAME, names.font_name.clone()),
        ];

        Name::new(
            records
                .into_iter()
                .map(|(name_id, value)| NameRecord::new(3, 1, 0x409, name_id, value.into()))
                .collect(),
        )
    }
}

fn font_error(table: &str, err: impl std::fmt::Debug) -> anyhow::Error {
    Error::Font(format!("unable to write {table} table: {err:?}")).into()
}

impl FontAssembler for TrueTypeAssembler {
    fn assemble(&mut self, names: &FontNames, glyphs: &GlyphImages) -> Result<Vec<u8>> {
        let grid = EmGrid::new(self.units_per_em, self.image_size);
        let advance = grid.units_per_em;

        let mut outlines = vec![OutlineGlyph {
            name: ".notdef".into(),
            glyph: Glyph::Empty,
            bounds: None,
            points: 0,
            contours: 0,
        }];
        let mut mappings = Vec::new();

        for (&code_point, image) in glyphs {
            let Some(ch) = char::from_u32(code_point) else {
                warn!(target: LOG_TARGET, "skipping {code_point}: not a unicode scalar value");
                continue;
            };

            if image.dimensions() != (self.image_size, self.image_size) {
                warn!(
                    target: LOG_TARGET,
                    "skipping {code_point}: image is {:?}, expected {}x{}",
                    image.dimensions(),
                    self.image_size,
                    self.image_size
                );
                continue;
            }

            mappings.push((ch, GlyphId::new(outlines.len() as u32)));
            outlines.push(self.glyph(grid, code_point, image)?);
        }

        let num_glyphs = u16::try_from(outlines.len()).map_err(|_| anyhow!("too many glyphs: {}", outlines.len()))?;

        let mut glyf_loca = GlyfLocaBuilder::new();
        for outline in &outlines {
            glyf_loca.add_glyph(&outline.glyph).map_err(|err| font_error("glyf", err))?;
        }
        let (glyf, loca, loca_format) = glyf_loca.build();

        let font_bounds = outlines
            .iter()
            .filter_map(|o| o.bounds)
            .reduce(Bounds::union)
            .unwrap_or(Bounds {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 0.0,
                y_max: 0.0,
            });

        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            units_per_em: grid.units_per_em,
            x_min: font_bounds.x_min as i16,
            y_min: font_bounds.y_min as i16,
            x_max: font_bounds.x_max as i16,
            y_max: font_bounds.y_max as i16,
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
            ..Default::default()
        };

        let h_metrics: Vec<LongMetric> = outlines
            .iter()
            .map(|o| LongMetric::new(advance, o.bounds.map_or(0, |b| b.x_min as i16)))
            .collect();
        let min_lsb = outlines.iter().filter_map(|o| o.bounds).map(|b| b.x_min as i16).min().unwrap_or(0);
        let min_rsb = outlines
            .iter()
            .filter_map(|o| o.bounds)
            .map(|b| advance as i16 - b.x_max as i16)
            .min()
            .unwrap_or(0);

        let hhea = Hhea::new(
            FWord::new(grid.ascent),
            FWord::new(-grid.descent),
            FWord::new(0),
            UfWord::new(advance),
            FWord::new(min_lsb),
            FWord::new(min_rsb),
            FWord::new(font_bounds.x_max as i16),
            1,
            0,
            0,
            num_glyphs,
        );
        let hmtx = Hmtx::new(h_metrics, Vec::new());

        let max_points = outlines.iter().map(|o| o.points).max().unwrap_or(0);
        let max_contours = outlines.iter().map(|o| o.contours).max().unwrap_or(0);

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(max_points as u16),
            max_contours: Some(max_contours as u16),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let first_char = mappings.first().map_or(0, |(ch, _)| u32::from(*ch).min(0xFFFF) as u16);
        let last_char = mappings.last().map_or(0, |(ch, _)| u32::from(*ch).min(0xFFFF) as u16);
        let os2 = Os2 {
            x_avg_char_width: advance as i16,
            us_weight_class: 400,
            us_width_class: 5,
            s_typo_ascender: grid.ascent,
            s_typo_descender: -grid.descent,
            s_typo_line_gap: 0,
            us_win_ascent: grid.ascent as u16,
            us_win_descent: grid.descent as u16,
            us_first_char_index: first_char,
            us_last_char_index: last_char,
            ..Default::default()
        };

        let cmap = Cmap::from_mappings(mappings).map_err(|err| font_error("cmap", err))?;
        let name = Self::names_table(names);
        let post = Post::new_v2(outlines.iter().map(|o| o.name.as_str()));

        let mut builder = FontBuilder::new();
        builder.add_table(&head).map_err(|err| font_error("head", err))?;
        builder.add_table(&hhea).map_err(|err| font_error("hhea", err))?;
        builder.add_table(&maxp).map_err(|err| font_error("maxp", err))?;
        builder.add_table(&os2).map_err(|err| font_error("OS/2", err))?;
        builder.add_table(&hmtx).map_err(|err| font_error("hmtx", err))?;
        builder.add_table(&cmap).map_err(|err| font_error("cmap", err))?;
        builder.add_table(&loca).map_err(|err| font_error("loca", err))?;
        builder.add_table(&glyf).map_err(|err| font_error("glyf", err))?;
        builder.add_table(&name).map_err(|err| font_error("name", err))?;
        builder.add_table(&post).map_err(|err| font_error("post", err))?;

        debug!(target: LOG_TARGET, "assembled {num_glyphs} glyphs");
        Ok(builder.build())
    }
}
