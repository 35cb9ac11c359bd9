use geom::{vec3, Trajectory, Vec3};
use markings::styles::{
    ChevronFiller, DashedLine, GrassFiller, NetworkLine, PropLine, SharkTeethLine, SolidLine, StopSolidLine,
    StripeFiller, TextLine, ZebraCrosswalk, ZigZagLine,
};
use markings::xml::{from_xml_str, to_xml_string, XmlContext};
use markings::{
    Contour, FillerGeometry, LineGeometry, Markings, NetworkInfo, PrefabInfo, StaticCatalog, Style, StyleError,
    StyleProperties,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A set of markings as stored on disk, styles are kept in their xml form
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub catalog: StaticCatalog,
    pub lines: Vec<SceneLine>,
    pub fillers: Vec<SceneFiller>,
}

#[derive(Serialize, Deserialize)]
pub struct SceneLine {
    /// Two points for a straight line, four for a bezier
    pub points: Vec<Vec3>,
    pub style: String,
    /// The points run against the direction the style was saved with
    #[serde(default)]
    pub invert: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SceneFiller {
    pub points: Vec<Vec3>,
    pub style: String,
}

impl SceneLine {
    fn trajectory(&self) -> Option<Trajectory> {
        match *self.points.as_slice() {
            [a, b] => Some(Trajectory::straight(a, b)),
            [a, b, c, d] => Some(Trajectory::bezier(a, b, c, d)),
            _ => None,
        }
    }
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Option<Scene> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(x) => x,
            Err(e) => {
                log::error!("could not read scene {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(x) => Some(x),
            Err(e) => {
                log::error!("invalid scene {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Adds every marking of the scene, skipping the broken ones. Returns how many were added.
    pub fn populate(&self, markings: &mut Markings) -> usize {
        let mut added = 0;

        for (i, line) in self.lines.iter().enumerate() {
            let Some(trajectory) = line.trajectory() else {
                log::warn!("line {} has {} points, expected 2 or 4", i, line.points.len());
                continue;
            };
            let ctx = XmlContext {
                invert: line.invert,
                ..Default::default()
            };
            let style = match from_xml_str(&line.style, ctx) {
                Ok(Style::Line(s)) => s,
                Ok(Style::Filler(f)) => {
                    log::warn!("line {} has a filler style {:?}", i, f.style_type());
                    continue;
                }
                Err(e) => {
                    log::warn!("line {}: {}", i, e);
                    continue;
                }
            };
            markings.add_line(style, LineGeometry::new(trajectory));
            added += 1;
        }

        for (i, filler) in self.fillers.iter().enumerate() {
            let style = match from_xml_str(&filler.style, XmlContext::default()) {
                Ok(Style::Filler(s)) => s,
                Ok(Style::Line(l)) => {
                    log::warn!("filler {} has a line style {:?}", i, l.style_type());
                    continue;
                }
                Err(e) => {
                    log::warn!("filler {}: {}", i, e);
                    continue;
                }
            };
            let contour = Contour::from_points(&filler.points);
            if contour.is_degenerate() {
                log::debug!("filler {} is degenerate", i);
            }
            markings.add_filler(style, FillerGeometry::new(contour));
            added += 1;
        }

        added
    }

    /// A four way intersection using most styles
    pub fn demo() -> Result<Scene, StyleError> {
        let catalog = StaticCatalog::default()
            .with_prefab(
                "bollard",
                PrefabInfo {
                    length: 0.25,
                    width: 0.25,
                    default_color: geom::Color::WHITE,
                    variations: vec![geom::Color::RED],
                },
            )
            .with_network(
                "fence",
                NetworkInfo {
                    width: 0.1,
                    segment_length: 2.5,
                },
            );

        let mut scene = Scene {
            catalog,
            ..Default::default()
        };

        let approaches = [
            (vec3(-1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)),
            (vec3(1.0, 0.0, 0.0), vec3(0.0, -1.0, 0.0)),
            (vec3(0.0, -1.0, 0.0), vec3(-1.0, 0.0, 0.0)),
            (vec3(0.0, 1.0, 0.0), vec3(1.0, 0.0, 0.0)),
        ];
        for (dir, side) in approaches {
            let at = |d: f32, s: f32| dir * d + side * s;
            scene.line(&[at(40.0, 0.0), at(12.0, 0.0)], &DashedLine::default())?;
            scene.line(&[at(9.0, 0.0), at(9.0, -6.0)], &StopSolidLine::default())?;
            scene.line(&[at(8.0, -6.0), at(8.0, 6.0)], &ZebraCrosswalk::default())?;
            scene.line(&[at(40.0, -6.0), at(12.0, -6.0)], &SolidLine::default())?;
        }

        scene.line(
            &[
                vec3(-6.0, -3.0, 0.0),
                vec3(-1.0, -3.0, 0.0),
                vec3(3.0, 1.0, 0.0),
                vec3(3.0, 6.0, 0.0),
            ],
            &DashedLine {
                dash_length: 1.0,
                space_length: 1.0,
                ..Default::default()
            },
        )?;
        scene.line(
            &[vec3(-30.0, -3.0, 0.0), vec3(-20.0, -3.0, 0.0)],
            &TextLine {
                text: "BUS".to_string(),
                ..Default::default()
            },
        )?;
        scene.line(&[vec3(20.0, -6.0, 0.0), vec3(38.0, -6.0, 0.0)], &ZigZagLine::default())?;
        scene.line(&[vec3(9.0, 0.0, 0.0), vec3(9.0, 6.0, 0.0)], &SharkTeethLine::default())?;
        scene.line(
            &[vec3(12.0, 12.0, 0.0), vec3(30.0, 12.0, 0.0)],
            &PropLine {
                prefab: "bollard".to_string(),
                ..Default::default()
            },
        )?;
        scene.line(
            &[vec3(-30.0, 12.0, 0.0), vec3(-12.0, 12.0, 0.0)],
            &NetworkLine {
                prefab: "fence".to_string(),
                ..Default::default()
            },
        )?;

        scene.filler(
            &[
                vec3(-30.0, 0.5, 0.0),
                vec3(-14.0, 0.5, 0.0),
                vec3(-14.0, 3.0, 0.0),
            ],
            &ChevronFiller::default(),
        )?;
        scene.filler(
            &[
                vec3(-30.0, -30.0, 0.0),
                vec3(-14.0, -30.0, 0.0),
                vec3(-14.0, -14.0, 0.0),
                vec3(-30.0, -14.0, 0.0),
            ],
            &StripeFiller::default(),
        )?;
        scene.filler(
            &[
                vec3(14.0, 14.0, 0.0),
                vec3(30.0, 14.0, 0.0),
                vec3(30.0, 30.0, 0.0),
                vec3(14.0, 30.0, 0.0),
            ],
            &GrassFiller::default(),
        )?;

        Ok(scene)
    }

    fn line(&mut self, points: &[Vec3], style: &dyn StyleProperties) -> Result<(), StyleError> {
        self.lines.push(SceneLine {
            points: points.to_vec(),
            style: to_xml_string(style)?,
            invert: false,
        });
        Ok(())
    }

    fn filler(&mut self, points: &[Vec3], style: &dyn StyleProperties) -> Result<(), StyleError> {
        self.fillers.push(SceneFiller {
            points: points.to_vec(),
            style: to_xml_string(style)?,
        });
        Ok(())
    }
}
