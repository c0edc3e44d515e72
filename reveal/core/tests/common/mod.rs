//! Recording fake backend shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use reveal_core::{
    MonitorInfo, MonitorRef, OverlayConfig, RenderFrame, RevealMode, Surface, SurfaceBackend,
    SurfaceError, SurfaceEvent, SurfaceId, SurfaceStyle,
};

/// Something the fake user does to a surface
#[derive(Clone, Copy, Debug)]
pub enum Gesture {
    /// Close this surface
    Close,
    /// Press Escape
    Dismiss,
}

/// What the fake surfaces saw
#[derive(Debug, Default)]
pub struct Recorder {
    /// Every frame pushed, in order, tagged with the receiving surface
    pub frames: Vec<(SurfaceId, RenderFrame)>,
    /// Surfaces created
    pub created: Vec<SurfaceId>,
    /// Surfaces destroyed (duplicates would mean a double destroy)
    pub destroyed: Vec<SurfaceId>,
}

impl Recorder {
    /// Frames one surface received, in order
    pub fn frames_for(&self, id: SurfaceId) -> Vec<RenderFrame> {
        self.frames
            .iter()
            .filter(|(s, _)| *s == id)
            .map(|(_, f)| f.clone())
            .collect()
    }
}

pub type Shared = Rc<RefCell<Recorder>>;

struct RecordingSurface {
    id: SurfaceId,
    recorder: Shared,
    /// Frames accepted before failing; `None` never fails
    budget: Option<usize>,
    /// After this many frames, report the gesture
    gesture: Option<(usize, Gesture, UnboundedSender<SurfaceEvent>)>,
    shown: usize,
    destroyed: bool,
}

impl Surface for RecordingSurface {
    fn set_text(&mut self, frame: &RenderFrame, _: &SurfaceStyle) -> Result<(), SurfaceError> {
        if self.destroyed {
            return Err(SurfaceError::Closed);
        }
        if let Some(budget) = self.budget.as_mut() {
            if *budget == 0 {
                return Err(SurfaceError::Backend("output disappeared".into()));
            }
            *budget -= 1;
        }
        self.recorder.borrow_mut().frames.push((self.id, frame.clone()));
        self.shown += 1;
        if let Some((after, gesture, tx)) = &self.gesture {
            if self.shown == *after {
                let event = match gesture {
                    Gesture::Close => SurfaceEvent::Closed(self.id),
                    Gesture::Dismiss => SurfaceEvent::Dismissed(self.id),
                };
                let _ = tx.send(event);
            }
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.recorder.borrow_mut().destroyed.push(self.id);
        }
    }
}

/// Backend with `monitors` outputs and scripted failures
pub struct RecordingBackend {
    pub recorder: Shared,
    pub monitors: usize,
    pub fail_create: Vec<usize>,
    pub render_budget: HashMap<usize, usize>,
    pub gestures: HashMap<usize, (usize, Gesture)>,
    pub events: Option<UnboundedSender<SurfaceEvent>>,
}

impl RecordingBackend {
    pub fn new(monitors: usize) -> Self {
        Self {
            recorder: Rc::default(),
            monitors,
            fail_create: Vec::new(),
            render_budget: HashMap::new(),
            gestures: HashMap::new(),
            events: None,
        }
    }

    /// Report `gesture` on monitor `index` once it has shown `frames` frames
    pub fn gesture(
        mut self,
        index: usize,
        frames: usize,
        gesture: Gesture,
        tx: &UnboundedSender<SurfaceEvent>,
    ) -> Self {
        self.gestures.insert(index, (frames, gesture));
        self.events = Some(tx.clone());
        self
    }

    pub fn failing_on(mut self, indices: &[usize]) -> Self {
        self.fail_create = indices.to_vec();
        self
    }

    pub fn render_budget(mut self, index: usize, frames: usize) -> Self {
        self.render_budget.insert(index, frames);
        self
    }
}

impl SurfaceBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn monitors(&mut self) -> Result<Vec<MonitorInfo>, SurfaceError> {
        Ok((0..self.monitors)
            .map(|index| MonitorInfo {
                index,
                name: format!("HDMI-A-{}", index + 1),
                width: 2560,
                height: 1440,
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
            return Err(SurfaceError::Backend(format!("layer surface refused on {target}")));
        }
        self.recorder.borrow_mut().created.push(id);
        Ok(Box::new(RecordingSurface {
            id,
            recorder: Rc::clone(&self.recorder),
            budget: self.render_budget.get(&index).copied(),
            gesture: self
                .gestures
                .get(&index)
                .zip(self.events.clone())
                .map(|(&(after, gesture), tx)| (after, gesture, tx)),
            shown: 0,
            destroyed: false,
        }))
    }
}

pub fn char_config(speed: f64, exit_after_secs: f64) -> OverlayConfig {
    OverlayConfig {
        mode: RevealMode::Char,
        speed,
        exit_after: (exit_after_secs > 0.0).then(|| Duration::from_secs_f64(exit_after_secs)),
        ..OverlayConfig::default()
    }
}
