//! Surface Set Manager
//!
//! Owns every surface for the run and fans frames out to them in lock-step.
//!
//! # Ownership
//!
//! Surfaces live in an arena keyed by [`SurfaceId`]. Nothing outside the
//! manager holds a surface, so destruction always goes through
//! [`SurfaceSet::close`] or [`SurfaceSet::destroy`] and happens exactly once.
//!
//! # Failure policy
//!
//! - Creation: a failed monitor is reported and skipped; failing on every
//!   target is fatal.
//! - Apply: a surface that rejects a frame is destroyed and dropped from the
//!   set; the others keep going.

use std::collections::BTreeMap;

use crate::config::MonitorSelection;
use crate::error::RevealError;
use crate::render::RenderFrame;
use crate::surface::{MonitorRef, Surface, SurfaceBackend, SurfaceError, SurfaceId, SurfaceStyle};

struct ManagedSurface {
    target: MonitorRef,
    surface: Box<dyn Surface>,
}

/// A target that could not get a surface
#[derive(Debug)]
pub struct CreationFailure {
    /// The monitor that failed
    pub target: MonitorRef,
    /// Why it failed
    pub error: SurfaceError,
}

/// Outcome of [`SurfaceSet::apply`]
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Surfaces that now show the frame
    pub delivered: usize,
    /// Surfaces dropped because they rejected the frame
    pub dropped: Vec<(SurfaceId, SurfaceError)>,
}

impl ApplyReport {
    /// Check if every surface took the frame
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// The set of live surfaces
pub struct SurfaceSet {
    surfaces: BTreeMap<SurfaceId, ManagedSurface>,
    style: SurfaceStyle,
    failures: Vec<CreationFailure>,
}

impl SurfaceSet {
    /// Resolve `selection` once and create a surface per target
    ///
    /// # Errors
    ///
    /// Returns [`RevealError::SurfaceCreation`] when no surface could be
    /// created on any target.
    pub fn create(
        backend: &mut dyn SurfaceBackend,
        selection: MonitorSelection,
        style: SurfaceStyle,
    ) -> Result<Self, RevealError> {
        let targets = resolve_targets(backend, selection);
        let mut set = Self {
            surfaces: BTreeMap::new(),
            style,
            failures: Vec::new(),
        };

        for (index, target) in targets.into_iter().enumerate() {
            let id = SurfaceId::new(u32::try_from(index).unwrap_or(u32::MAX));
            match backend.create_surface(id, &target, &set.style) {
                Ok(surface) => {
                    tracing::info!(surface = %id, %target, backend = backend.name(), "Surface created");
                    set.surfaces.insert(id, ManagedSurface { target, surface });
                }
                Err(error) => {
                    tracing::warn!(%target, %error, "Surface creation failed");
                    set.failures.push(CreationFailure { target, error });
                }
            }
        }

        if set.surfaces.is_empty() {
            return Err(RevealError::SurfaceCreation {
                failures: std::mem::take(&mut set.failures),
            });
        }

        if !set.failures.is_empty() {
            tracing::warn!(
                created = set.surfaces.len(),
                failed = set.failures.len(),
                "Continuing on the surfaces that were created"
            );
        }
        Ok(set)
    }

    /// Targets that failed during [`SurfaceSet::create`]
    #[must_use]
    pub fn creation_failures(&self) -> &[CreationFailure] {
        &self.failures
    }

    /// Push the same frame to every surface
    pub fn apply(&mut self, frame: &RenderFrame) -> ApplyReport {
        let mut report = ApplyReport::default();
        let mut failed = Vec::new();

        for (id, managed) in &mut self.surfaces {
            match managed.surface.set_text(frame, &self.style) {
                Ok(()) => report.delivered += 1,
                Err(error) => failed.push((*id, error)),
            }
        }

        for (id, error) in failed {
            if let Some(mut managed) = self.surfaces.remove(&id) {
                tracing::warn!(surface = %id, target = %managed.target, %error, "Dropping surface after render failure");
                managed.surface.destroy();
            }
            report.dropped.push((id, error));
        }

        report
    }

    /// Destroy and forget one surface (closed by the user or compositor)
    ///
    /// Returns false if the surface was not in the set.
    pub fn close(&mut self, id: SurfaceId) -> bool {
        match self.surfaces.remove(&id) {
            Some(mut managed) => {
                managed.surface.destroy();
                tracing::info!(surface = %id, remaining = self.surfaces.len(), "Surface closed");
                true
            }
            None => false,
        }
    }

    /// Destroy every surface; safe to call more than once
    pub fn destroy(&mut self) {
        let surfaces = std::mem::take(&mut self.surfaces);
        let count = surfaces.len();
        for (_, mut managed) in surfaces {
            managed.surface.destroy();
        }
        if count > 0 {
            tracing::info!(count, "Surfaces destroyed");
        }
    }

    /// Check if a surface is still live
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// IDs of live surfaces, in creation order
    #[must_use]
    pub fn ids(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().copied().collect()
    }

    /// Number of live surfaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True when every surface is gone
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Drop for SurfaceSet {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SurfaceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceSet")
            .field("surfaces", &self.ids())
            .field("failures", &self.failures.len())
            .finish()
    }
}

/// Turn a selection into concrete targets
///
/// Hot-plugged monitors are not picked up later: this runs once.
fn resolve_targets(backend: &mut dyn SurfaceBackend, selection: MonitorSelection) -> Vec<MonitorRef> {
    match selection {
        MonitorSelection::Focused => vec![MonitorRef::Focused],
        MonitorSelection::All => match backend.monitors() {
            Ok(monitors) if !monitors.is_empty() => {
                monitors.into_iter().map(MonitorRef::Output).collect()
            }
            Ok(_) => {
                tracing::warn!(
                    backend = backend.name(),
                    "No monitors reported, falling back to the focused monitor"
                );
                vec![MonitorRef::Focused]
            }
            Err(error) => {
                tracing::warn!(
                    backend = backend.name(),
                    %error,
                    "Monitor enumeration failed, falling back to the focused monitor"
                );
                vec![MonitorRef::Focused]
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use crate::render::Alignment;
    use crate::surface::MonitorInfo;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeSurface {
        id: SurfaceId,
        log: Log,
        fail_render: bool,
    }

    impl Surface for FakeSurface {
        fn set_text(&mut self, frame: &RenderFrame, _: &SurfaceStyle) -> Result<(), SurfaceError> {
            if self.fail_render {
                return Err(SurfaceError::Closed);
            }
            self.log
                .borrow_mut()
                .push(format!("{} show {:?}", self.id, frame.visible_text));
            Ok(())
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push(format!("{} destroy", self.id));
        }
    }

    struct FakeBackend {
        monitors: Result<usize, ()>,
        fail_create: Vec<usize>,
        fail_render: Vec<usize>,
        log: Log,
    }

    impl FakeBackend {
        fn new(monitors: usize) -> Self {
            Self {
                monitors: Ok(monitors),
                fail_create: Vec::new(),
                fail_render: Vec::new(),
                log: Rc::default(),
            }
        }
    }

    impl SurfaceBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn monitors(&mut self) -> Result<Vec<MonitorInfo>, SurfaceError> {
            let count = self
                .monitors
                .map_err(|()| SurfaceError::Unavailable("no outputs".into()))?;
            Ok((0..count)
                .map(|index| MonitorInfo {
                    index,
                    name: format!("OUT-{index}"),
                    width: 1920,
                    height: 1080,
                })
                .collect())
        }

        fn create_surface(
            &mut self,
            id: SurfaceId,
            target: &MonitorRef,
            _: &SurfaceStyle,
        ) -> Result<Box<dyn Surface>, SurfaceError> {
            let index = match target {
                MonitorRef::Focused => 0,
                MonitorRef::Output(info) => info.index,
            };
            if self.fail_create.contains(&index) {
                return Err(SurfaceError::Backend(format!("cannot map {target}")));
            }
            Ok(Box::new(FakeSurface {
                id,
                log: Rc::clone(&self.log),
                fail_render: self.fail_render.contains(&index),
            }))
        }
    }

    fn style() -> SurfaceStyle {
        SurfaceStyle::from_config(&OverlayConfig::default())
    }

    fn frame(text: &str) -> RenderFrame {
        RenderFrame {
            visible_text: text.to_string(),
            alignment: Alignment::Center,
            reserve: None,
        }
    }

    #[test]
    fn test_one_surface_per_monitor() {
        let mut backend = FakeBackend::new(3);
        let set = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.creation_failures().is_empty());
    }

    #[test]
    fn test_focused_creates_exactly_one() {
        let mut backend = FakeBackend::new(3);
        let set = SurfaceSet::create(&mut backend, MonitorSelection::Focused, style()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_partial_creation_failure_is_tolerated() {
        let mut backend = FakeBackend::new(3);
        backend.fail_create = vec![1];
        let set = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.creation_failures().len(), 1);
        assert!(matches!(
            &set.creation_failures()[0].target,
            MonitorRef::Output(info) if info.name == "OUT-1"
        ));
    }

    #[test]
    fn test_total_creation_failure_is_fatal() {
        let mut backend = FakeBackend::new(3);
        backend.fail_create = vec![0, 1, 2];
        let err = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap_err();
        match err {
            RevealError::SurfaceCreation { failures } => assert_eq!(failures.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_enumeration_failure_falls_back_to_focused() {
        let mut backend = FakeBackend::new(0);
        backend.monitors = Err(());
        let set = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap();
        assert_eq!(set.len(), 1);

        let mut empty = FakeBackend::new(0);
        let set = SurfaceSet::create(&mut empty, MonitorSelection::All, style()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_apply_drops_failing_surface() {
        let mut backend = FakeBackend::new(3);
        backend.fail_render = vec![2];
        let log = Rc::clone(&backend.log);
        let mut set = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap();

        let report = set.apply(&frame("hi"));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.dropped.len(), 1);
        assert!(!set.contains(report.dropped[0].0));
        assert_eq!(set.len(), 2);

        let report = set.apply(&frame("hi!"));
        assert!(report.all_succeeded());
        assert_eq!(report.delivered, 2);
        assert!(log.borrow().contains(&"surface-2 destroy".to_string()));
    }

    #[test]
    fn test_destroy_happens_once() {
        let mut backend = FakeBackend::new(2);
        let log = Rc::clone(&backend.log);
        let mut set = SurfaceSet::create(&mut backend, MonitorSelection::All, style()).unwrap();

        assert!(set.close(SurfaceId::new(0)));
        assert!(!set.close(SurfaceId::new(0)));
        set.destroy();
        set.destroy();
        drop(set);

        let destroys = log.borrow().iter().filter(|l| l.ends_with("destroy")).count();
        assert_eq!(destroys, 2);
    }
}
