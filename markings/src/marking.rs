//! Lines and fillers with their styles, the render cache, and change dispatch.
//! Subscribers are told about every change so a renderer can rebuild what it shows.

use crate::capability::copy_properties;
use crate::error::PropertyError;
use crate::property::{PropertyName, PropertyValue, StyleProperties};
use crate::styles::{CalcContext, FillerGeometry, FillerStyle, LineGeometry, LineStyle, Style};
use crate::{MarkingLod, StyleData, StyleGroup, StyleType};
use common::FastMap;
use derive_more::From;
use slotmapd::{new_key_type, SlotMap};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

new_key_type! {
    pub struct LineID;
}

new_key_type! {
    pub struct FillerID;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
pub enum MarkingID {
    Line(LineID),
    Filler(FillerID),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub style: LineStyle,
    pub geometry: LineGeometry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filler {
    pub style: FillerStyle,
    pub geometry: FillerGeometry,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Style,
    Geometry,
    Removed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MarkingChange {
    pub id: MarkingID,
    pub kind: ChangeKind,
}

#[derive(Default)]
pub struct MarkingSubscribers(Mutex<Vec<MarkingSubscriber>>);

impl MarkingSubscribers {
    pub fn subscribe(&self) -> MarkingSubscriber {
        let sub = MarkingSubscriber::default();
        self.0.lock().unwrap().push(sub.clone());
        sub
    }

    pub fn dispatch(&self, change: MarkingChange) {
        let me = self.0.lock().unwrap();
        for sub in me.iter() {
            sub.dispatch(change);
        }
    }
}

#[derive(Default)]
pub struct MarkingSubscriberInner {
    pub changes: Vec<MarkingChange>,
}

/// Receives every change made to the markings
#[derive(Clone, Default)]
pub struct MarkingSubscriber {
    inner: Arc<Mutex<MarkingSubscriberInner>>,
}

impl MarkingSubscriber {
    /// Changes since the last call, in the order they happened
    pub fn take_changes(&mut self) -> Vec<MarkingChange> {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.changes)
    }

    /// Distinct markings changed since the last call
    pub fn take_changed(&mut self) -> BTreeSet<MarkingID> {
        self.take_changes().into_iter().map(|c| c.id).collect()
    }

    fn dispatch(&self, change: MarkingChange) {
        self.inner.lock().unwrap().changes.push(change);
    }
}

/// Every marking of an intersection
#[derive(Default)]
pub struct Markings {
    lines: SlotMap<LineID, Line>,
    fillers: SlotMap<FillerID, Filler>,
    cache: FastMap<MarkingID, Vec<StyleData>>,
    dirty: BTreeSet<MarkingID>,
    pub subscribers: MarkingSubscribers,
}

impl Markings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, style: LineStyle, geometry: LineGeometry) -> LineID {
        let id = self.lines.insert(Line { style, geometry });
        self.invalidate(id.into(), ChangeKind::Added);
        id
    }

    pub fn add_filler(&mut self, style: FillerStyle, geometry: FillerGeometry) -> FillerID {
        let id = self.fillers.insert(Filler { style, geometry });
        self.invalidate(id.into(), ChangeKind::Added);
        id
    }

    pub fn line(&self, id: LineID) -> Option<&Line> {
        self.lines.get(id)
    }

    pub fn filler(&self, id: FillerID) -> Option<&Filler> {
        self.fillers.get(id)
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineID, &Line)> {
        self.lines.iter()
    }

    pub fn fillers(&self) -> impl Iterator<Item = (FillerID, &Filler)> {
        self.fillers.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len() + self.fillers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: MarkingID) -> bool {
        match id {
            MarkingID::Line(id) => self.lines.contains_key(id),
            MarkingID::Filler(id) => self.fillers.contains_key(id),
        }
    }

    pub fn style(&self, id: MarkingID) -> Option<&dyn StyleProperties> {
        match id {
            MarkingID::Line(id) => self.lines.get(id).map(|l| &l.style as &dyn StyleProperties),
            MarkingID::Filler(id) => self.fillers.get(id).map(|f| &f.style as &dyn StyleProperties),
        }
    }

    fn style_mut(&mut self, id: MarkingID) -> Option<&mut dyn StyleProperties> {
        match id {
            MarkingID::Line(id) => self.lines.get_mut(id).map(|l| &mut l.style as &mut dyn StyleProperties),
            MarkingID::Filler(id) => self
                .fillers
                .get_mut(id)
                .map(|f| &mut f.style as &mut dyn StyleProperties),
        }
    }

    /// Sets one property. Returns whether the value changed, only a change is dispatched
    /// and drops the cached render data of that marking.
    pub fn set_property(
        &mut self,
        id: impl Into<MarkingID>,
        name: PropertyName,
        value: PropertyValue,
    ) -> Result<bool, PropertyError> {
        let id = id.into();
        let style = self.style_mut(id).ok_or(PropertyError::UnknownMarking)?;
        let old = style.get_property(name);
        style.set_property(name, value)?;
        if style.get_property(name) == old {
            return Ok(false);
        }
        self.invalidate(id, ChangeKind::Style);
        Ok(true)
    }

    pub fn set_line_property(&mut self, id: LineID, name: PropertyName, value: PropertyValue) -> Result<bool, PropertyError> {
        self.set_property(id, name, value)
    }

    pub fn set_filler_property(
        &mut self,
        id: FillerID,
        name: PropertyName,
        value: PropertyValue,
    ) -> Result<bool, PropertyError> {
        self.set_property(id, name, value)
    }

    /// Replaces the whole style of a marking
    pub fn set_style(&mut self, id: impl Into<MarkingID>, style: Style) -> Result<(), PropertyError> {
        let id = id.into();
        match (id, style) {
            (MarkingID::Line(l), Style::Line(s)) => {
                self.lines.get_mut(l).ok_or(PropertyError::UnknownMarking)?.style = s;
            }
            (MarkingID::Filler(f), Style::Filler(s)) => {
                self.fillers.get_mut(f).ok_or(PropertyError::UnknownMarking)?.style = s;
            }
            (_, s) => return Err(PropertyError::IncompatibleType(s.as_properties().style_type())),
        }
        self.invalidate(id, ChangeKind::Style);
        Ok(())
    }

    /// Switches a marking to another style type, keeping every setting both types share
    pub fn change_style_type(&mut self, id: impl Into<MarkingID>, t: StyleType) -> Result<usize, PropertyError> {
        let id = id.into();
        let current = self.style(id).ok_or(PropertyError::UnknownMarking)?;
        let is_filler = matches!(id, MarkingID::Filler(_));
        if (t.group() == StyleGroup::Filler) != is_filler {
            return Err(PropertyError::IncompatibleType(t));
        }
        let mut next = Style::default_for(t);
        let copied = copy_properties(current, next.as_properties_mut());
        self.set_style(id, next)?;
        Ok(copied)
    }

    /// Copies the shared settings of one marking's style onto another's
    pub fn copy_style(&mut self, from: impl Into<MarkingID>, to: impl Into<MarkingID>) -> Result<usize, PropertyError> {
        let (from, to) = (from.into(), to.into());
        let source = match from {
            MarkingID::Line(id) => Style::Line(self.lines.get(id).ok_or(PropertyError::UnknownMarking)?.style.clone()),
            MarkingID::Filler(id) => {
                Style::Filler(self.fillers.get(id).ok_or(PropertyError::UnknownMarking)?.style.clone())
            }
        };
        let target = self.style_mut(to).ok_or(PropertyError::UnknownMarking)?;
        let copied = copy_properties(source.as_properties(), target);
        if copied > 0 {
            self.invalidate(to, ChangeKind::Style);
        }
        Ok(copied)
    }

    pub fn set_line_geometry(&mut self, id: LineID, geometry: LineGeometry) -> Result<(), PropertyError> {
        self.lines.get_mut(id).ok_or(PropertyError::UnknownMarking)?.geometry = geometry;
        self.invalidate(id.into(), ChangeKind::Geometry);
        Ok(())
    }

    pub fn set_filler_geometry(&mut self, id: FillerID, geometry: FillerGeometry) -> Result<(), PropertyError> {
        self.fillers.get_mut(id).ok_or(PropertyError::UnknownMarking)?.geometry = geometry;
        self.invalidate(id.into(), ChangeKind::Geometry);
        Ok(())
    }

    pub fn remove(&mut self, id: impl Into<MarkingID>) -> bool {
        let id = id.into();
        let removed = match id {
            MarkingID::Line(id) => self.lines.remove(id).is_some(),
            MarkingID::Filler(id) => self.fillers.remove(id).is_some(),
        };
        if removed {
            self.cache.remove(&id);
            self.dirty.remove(&id);
            self.subscribers.dispatch(MarkingChange {
                id,
                kind: ChangeKind::Removed,
            });
        }
        removed
    }

    fn invalidate(&mut self, id: MarkingID, kind: ChangeKind) {
        self.cache.remove(&id);
        self.dirty.insert(id);
        self.subscribers.dispatch(MarkingChange { id, kind });
    }

    pub fn is_dirty(&self, id: impl Into<MarkingID>) -> bool {
        self.dirty.contains(&id.into())
    }

    /// Recalculates every changed marking for every lod, returns the recalculated ids
    pub fn update(&mut self, ctx: &CalcContext<'_>) -> Vec<MarkingID> {
        let dirty = std::mem::take(&mut self.dirty);
        let mut updated = Vec::with_capacity(dirty.len());
        for id in dirty {
            let data = match id {
                MarkingID::Line(l) => {
                    let line = common::unwrap_cont!(self.lines.get(l));
                    calculate_all(|lod| line.style.calculate(&line.geometry, lod, ctx))
                }
                MarkingID::Filler(f) => {
                    let filler = common::unwrap_cont!(self.fillers.get(f));
                    calculate_all(|lod| filler.style.calculate(&filler.geometry, lod, ctx))
                }
            };
            self.cache.insert(id, data);
            updated.push(id);
        }
        updated
    }

    /// Render data of a marking, None until it is calculated
    pub fn data(&self, id: impl Into<MarkingID>) -> Option<&[StyleData]> {
        self.cache.get(&id.into()).map(Vec::as_slice)
    }

    /// Every calculated primitive
    pub fn all_data(&self) -> impl Iterator<Item = &StyleData> {
        self.cache.values().flatten()
    }
}

fn calculate_all(mut f: impl FnMut(MarkingLod) -> Vec<StyleData>) -> Vec<StyleData> {
    MarkingLod::ALL.iter().flat_map(|&lod| f(lod)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{DashedLine, SolidFiller, SolidLine};
    use crate::{MarkingsConfig, StaticCatalog, TextCache};
    use crate::contour::Contour;
    use geom::{vec3, Color, Trajectory};

    fn geometry(y: f32) -> LineGeometry {
        LineGeometry::new(Trajectory::straight(vec3(0.0, y, 0.0), vec3(10.0, y, 0.0)))
    }

    fn update(m: &mut Markings) -> Vec<MarkingID> {
        let config = MarkingsConfig::default();
        let texts = TextCache::default();
        let prefabs = StaticCatalog::default();
        m.update(&CalcContext {
            config: &config,
            texts: &texts,
            prefabs: &prefabs,
        })
    }

    #[test]
    fn test_lifecycle() {
        let mut m = Markings::new();
        let mut sub = m.subscribers.subscribe();
        let a = m.add_line(DashedLine::default().into(), geometry(0.0));
        let b = m.add_line(SolidLine::default().into(), geometry(5.0));
        assert_eq!(sub.take_changes().len(), 2);
        assert!(m.data(a).is_none());

        assert_eq!(update(&mut m).len(), 2);
        assert!(m.data(a).is_some_and(|d| !d.is_empty()));
        assert!(!m.is_dirty(a));
        assert!(update(&mut m).is_empty());

        assert!(m.remove(b));
        assert!(!m.remove(b));
        assert!(m.data(b).is_none());
        assert_eq!(
            sub.take_changes(),
            vec![MarkingChange {
                id: b.into(),
                kind: ChangeKind::Removed
            }]
        );
        assert_eq!(
            m.set_line_property(b, PropertyName::Width, PropertyValue::Float(1.0)),
            Err(PropertyError::UnknownMarking)
        );
    }

    #[test]
    fn test_unchanged_value_does_nothing() {
        let mut m = Markings::new();
        let a = m.add_line(SolidLine::default().into(), geometry(0.0));
        update(&mut m);
        let mut sub = m.subscribers.subscribe();
        let width = SolidLine::default().width;
        assert_eq!(
            m.set_line_property(a, PropertyName::Width, PropertyValue::Float(width)),
            Ok(false)
        );
        assert!(sub.take_changes().is_empty());
        assert!(m.data(a).is_some());
    }

    #[test]
    fn test_change_style_type() {
        let mut m = Markings::new();
        let a = m.add_line(DashedLine::default().into(), geometry(0.0));
        m.set_line_property(a, PropertyName::Color, PropertyValue::Color(Color::RED))
            .unwrap();
        let copied = m.change_style_type(a, StyleType::LineDoubleDashed).unwrap();
        // color, width, dash and space
        assert_eq!(copied, 4);
        let line = m.line(a).unwrap();
        assert_eq!(line.style.style_type(), StyleType::LineDoubleDashed);
        assert_eq!(line.style.get_property(PropertyName::Color), Some(PropertyValue::Color(Color::RED)));

        assert_eq!(
            m.change_style_type(a, StyleType::FillerGrid),
            Err(PropertyError::IncompatibleType(StyleType::FillerGrid))
        );

        let f = m.add_filler(
            SolidFiller::default().into(),
            FillerGeometry::new(Contour::from_points(&[
                vec3(0.0, 0.0, 0.0),
                vec3(4.0, 0.0, 0.0),
                vec3(0.0, 4.0, 0.0),
            ])),
        );
        // a double dashed line and a solid filler share color and offset
        assert_eq!(m.copy_style(a, f).unwrap(), 2);
        assert_eq!(
            m.filler(f).unwrap().style.get_property(PropertyName::Color),
            Some(PropertyValue::Color(Color::RED))
        );
    }
}
