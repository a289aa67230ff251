//! Aggregation and observable pooling
//!
//! [`aggregate`] merges several device observables into one snapshot stream.
//! [`GestureEngine`] pools observables per (surface, device) pair so repeat
//! requests share one sensor attachment, and absorbs configuration changes
//! in place when the sensor allows it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gesture::config::ObservableConfig;
use crate::gesture::observable::{check_surface, make_sensor, GestureObservable};
use crate::gesture::reducer::reduce;
use crate::gesture::state::{GestureState, InputKind};
use crate::input::surface::InputSurface;
use crate::input::timer::TimerService;
use crate::sensor::{sensor_source, Sensor};
use crate::signal::Source;
use crate::{Error, Result};

/// Host collaborators bundled for engine calls
#[derive(Clone)]
pub struct GestureHost {
    pub surface: Rc<dyn InputSurface>,
    pub timer: Rc<dyn TimerService>,
}

impl GestureHost {
    pub fn new(surface: Rc<dyn InputSurface>, timer: Rc<dyn TimerService>) -> Self {
        Self { surface, timer }
    }
}

/// Per-device configuration of an aggregate stream; `None` disables the
/// device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateConfig {
    pub mouse: Option<ObservableConfig>,
    pub touch: Option<ObservableConfig>,
    pub wheel: Option<ObservableConfig>,
    pub keyboard: Option<ObservableConfig>,
}

impl AggregateConfig {
    /// Enable every device with the same configuration
    pub fn all(config: &ObservableConfig) -> Self {
        Self {
            mouse: Some(config.clone()),
            touch: Some(config.clone()),
            wheel: Some(config.clone()),
            keyboard: Some(config.clone()),
        }
    }

    fn entries(&self) -> Vec<(InputKind, &ObservableConfig)> {
        [
            (InputKind::Mouse, self.mouse.as_ref()),
            (InputKind::Touch, self.touch.as_ref()),
            (InputKind::Wheel, self.wheel.as_ref()),
            (InputKind::Keyboard, self.keyboard.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, config)| config.map(|config| (kind, config)))
        .collect()
    }
}

/// Build a snapshot source for one device without pooling
fn build_source(
    host: &GestureHost,
    kind: InputKind,
    config: &ObservableConfig,
) -> Result<(Rc<RefCell<dyn Sensor>>, Source<GestureState>)> {
    config.validate()?;
    let sensor = make_sensor(kind, config);
    check_surface(&host.surface, &sensor)?;
    let source = sensor_source(
        Rc::clone(&host.surface),
        Rc::clone(&host.timer),
        Rc::clone(&sensor),
    )
    .scan(GestureState::initial(kind), |state, event| {
        reduce(state, &event)
    })
    .share();
    Ok((sensor, source))
}

/// Merge every enabled device into one observable
///
/// Each device keeps its own fold; the merged stream interleaves their
/// snapshots as delivered. At least one device must be enabled.
pub fn aggregate(host: &GestureHost, config: &AggregateConfig) -> Result<GestureObservable> {
    let entries = config.entries();
    if entries.is_empty() {
        return Err(Error::Config(
            "aggregate configuration enables no device".into(),
        ));
    }
    let mut sources = Vec::with_capacity(entries.len());
    for (kind, device_config) in entries {
        let (_, source) = build_source(host, kind, device_config)?;
        sources.push(source);
    }
    Ok(GestureObservable::from_source(
        Source::merge(sources).share(),
    ))
}

struct PoolEntry {
    kind: InputKind,
    surface: Rc<dyn InputSurface>,
    config: ObservableConfig,
    sensor: Rc<RefCell<dyn Sensor>>,
    source: Source<GestureState>,
}

/// Pools gesture observables per (surface, device) pair
///
/// Two requests for the same pair share one underlying sensor; a
/// configuration change is absorbed in place when the sensor can apply it
/// without reattaching listeners, and otherwise replaces the pooled entry.
#[derive(Default)]
pub struct GestureEngine {
    entries: RefCell<Vec<PoolEntry>>,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observable for one device on one surface, pooled
    pub fn observable(
        &self,
        host: &GestureHost,
        kind: InputKind,
        config: &ObservableConfig,
    ) -> Result<GestureObservable> {
        config.validate()?;
        let position = self.entries.borrow().iter().position(|entry| {
            entry.kind == kind && Rc::ptr_eq(&entry.surface, &host.surface)
        });

        if let Some(position) = position {
            let reusable = {
                let mut entries = self.entries.borrow_mut();
                let entry = &mut entries[position];
                if entry.config == *config {
                    true
                } else if entry.sensor.borrow_mut().update_config(config) {
                    entry.config = config.clone();
                    true
                } else {
                    false
                }
            };
            if reusable {
                let entries = self.entries.borrow();
                return Ok(GestureObservable::from_source(
                    entries[position].source.clone(),
                ));
            }
            // Listener mode changed: the pooled sensor cannot be updated in
            // place and a fresh attachment is required.
            tracing::debug!(?kind, "recreating pooled observable");
            self.entries.borrow_mut().remove(position);
        }

        let (sensor, source) = build_source(host, kind, config)?;
        self.entries.borrow_mut().push(PoolEntry {
            kind,
            surface: Rc::clone(&host.surface),
            config: config.clone(),
            sensor,
            source: source.clone(),
        });
        Ok(GestureObservable::from_source(source))
    }

    pub fn mouse(&self, host: &GestureHost, config: &ObservableConfig) -> Result<GestureObservable> {
        self.observable(host, InputKind::Mouse, config)
    }

    pub fn touch(&self, host: &GestureHost, config: &ObservableConfig) -> Result<GestureObservable> {
        self.observable(host, InputKind::Touch, config)
    }

    pub fn wheel(&self, host: &GestureHost, config: &ObservableConfig) -> Result<GestureObservable> {
        self.observable(host, InputKind::Wheel, config)
    }

    pub fn keyboard(
        &self,
        host: &GestureHost,
        config: &ObservableConfig,
    ) -> Result<GestureObservable> {
        self.observable(host, InputKind::Keyboard, config)
    }

    /// Number of pooled entries
    pub fn pooled(&self) -> usize {
        self.entries.borrow().len()
    }
}
