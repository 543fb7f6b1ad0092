//! Gesture normalizer: mouse and multi-touch into one event vocabulary.
//!
//! A single finger behaves like the left mouse button. Two fingers switch
//! to pinch mode, which emits zoom and pan together each frame and stays
//! active until every finger lifts. Taps, double-taps and long-presses are
//! classified by a small state machine that owns at most one timer; arming
//! a timer always replaces the previous one.
//!
//! Time is supplied by the host (event timestamps and [`GestureNormalizer::poll`]),
//! so the normalizer never reads a clock.

use crate::config::GestureConfig;
use crate::input::{InputEvent, MouseButton, Modifiers, PointerEvent, TouchEvent, TouchPhase};
use kurbo::{Point, Vec2};
use std::time::Duration;

/// What the board should do in response to raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    /// Drive the tool controller.
    Pointer(PointerEvent),
    /// Abandon the pointer gesture in progress without committing it.
    Cancel,
    /// Multiply the scale by `factor`, keeping the device point `focal` fixed.
    Zoom { focal: Point, factor: f64 },
    /// Pan the viewport by a device-pixel delta.
    Pan { delta: Vec2 },
    /// A quick touch with no follow-up inside the tap window.
    Tap { position: Point },
    /// Two quick touches inside the tap window.
    DoubleTap { position: Point },
    /// A stationary touch held past the long-press delay.
    LongPress { position: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    LongPress,
    TapExpiry,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    deadline: Duration,
    kind: TimerKind,
}

#[derive(Debug, Clone, Copy)]
struct PinchState {
    touch_a: u64,
    touch_b: u64,
    last_distance: f64,
    last_midpoint: Point,
}

#[derive(Debug, Clone, Copy)]
enum TapState {
    Idle,
    /// One finger down and forwarded as a pointer gesture. While it stays
    /// inside the slop a long-press timer is armed (first touch only).
    Pressed {
        id: u64,
        start: Point,
        last: Point,
        started: Duration,
        moved: bool,
        after_tap: bool,
    },
    /// A tap finished; waiting to see whether a second one follows.
    PendingTap { position: Point },
    /// Long-press fired; the rest of the touch is swallowed.
    LongPressed,
    /// Two or more fingers; suppressed until all lift.
    MultiTouch,
}

/// Turns raw mouse/touch input into [`GestureOutput`]s.
#[derive(Debug, Clone)]
pub struct GestureNormalizer {
    config: GestureConfig,
    state: TapState,
    timer: Option<Timer>,
    touches: Vec<(u64, Point)>,
    pinch: Option<PinchState>,
}

impl GestureNormalizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: TapState::Idle,
            timer: None,
            touches: Vec::new(),
            pinch: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a timer is waiting to fire.
    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether two-finger mode is active.
    pub fn is_multi_touch(&self) -> bool {
        matches!(self.state, TapState::MultiTouch)
    }

    fn arm(&mut self, kind: TimerKind, deadline: Duration) {
        self.timer = Some(Timer { deadline, kind });
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    /// Process one raw event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<GestureOutput> {
        match event {
            InputEvent::Pointer(pointer) => vec![GestureOutput::Pointer(pointer)],
            InputEvent::Wheel { position, delta } => self.wheel(position, delta),
            InputEvent::Touch(touch) => {
                let mut out = self.poll(touch.time);
                match touch.phase {
                    TouchPhase::Start => self.touch_start(touch, &mut out),
                    TouchPhase::Move => self.touch_move(touch, &mut out),
                    TouchPhase::End | TouchPhase::Cancel => self.touch_end(touch, &mut out),
                }
                out
            }
        }
    }

    /// Fire the timer if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Vec<GestureOutput> {
        let Some(timer) = self.timer else {
            return Vec::new();
        };
        if now < timer.deadline {
            return Vec::new();
        }
        self.timer = None;

        match (timer.kind, self.state) {
            (TimerKind::LongPress, TapState::Pressed { start, moved: false, .. }) => {
                log::debug!("gesture: long-press at {start:?}");
                self.state = TapState::LongPressed;
                vec![GestureOutput::LongPress { position: start }]
            }
            (TimerKind::TapExpiry, TapState::PendingTap { position }) => {
                log::debug!("gesture: tap at {position:?}");
                self.state = TapState::Idle;
                vec![GestureOutput::Tap { position }]
            }
            _ => Vec::new(),
        }
    }

    fn wheel(&self, position: Point, delta: Vec2) -> Vec<GestureOutput> {
        let step = self.config.wheel_zoom_step;
        let factor = if delta.y > 0.0 {
            1.0 / step
        } else if delta.y < 0.0 {
            step
        } else {
            return Vec::new();
        };
        vec![GestureOutput::Zoom { focal: position, factor }]
    }

    fn touch_start(&mut self, touch: TouchEvent, out: &mut Vec<GestureOutput>) {
        self.touches.retain(|(id, _)| *id != touch.id);
        self.touches.push((touch.id, touch.position));

        if self.touches.len() >= 2 {
            self.enter_multi_touch(out);
            return;
        }

        match self.state {
            TapState::Idle => {
                self.press(touch, false);
                self.arm(TimerKind::LongPress, touch.time + self.config.long_press_delay);
            }
            TapState::PendingTap { .. } => {
                // Second tap candidate: the pending single tap is cancelled.
                self.cancel_timer();
                self.press(touch, true);
            }
            _ => return,
        }
        out.push(GestureOutput::Pointer(PointerEvent::Down {
            position: touch.position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }));
    }

    fn press(&mut self, touch: TouchEvent, after_tap: bool) {
        self.state = TapState::Pressed {
            id: touch.id,
            start: touch.position,
            last: touch.position,
            started: touch.time,
            moved: false,
            after_tap,
        };
    }

    fn enter_multi_touch(&mut self, out: &mut Vec<GestureOutput>) {
        if let TapState::Pressed { last, .. } = self.state {
            log::debug!("gesture: second finger, dropping pointer gesture at {last:?}");
            out.push(GestureOutput::Cancel);
        }
        self.cancel_timer();
        self.state = TapState::MultiTouch;

        if self.pinch.is_some() {
            return;
        }
        if let [(a, pa), (b, pb), ..] = self.touches.as_slice() {
            log::debug!("gesture: pinch started");
            self.pinch = Some(PinchState {
                touch_a: *a,
                touch_b: *b,
                last_distance: pa.distance(*pb),
                last_midpoint: pa.midpoint(*pb),
            });
        }
    }

    fn touch_position(&self, id: u64) -> Option<Point> {
        self.touches.iter().find(|(t, _)| *t == id).map(|(_, p)| *p)
    }

    fn touch_move(&mut self, touch: TouchEvent, out: &mut Vec<GestureOutput>) {
        if let Some(entry) = self.touches.iter_mut().find(|(id, _)| *id == touch.id) {
            entry.1 = touch.position;
        }

        match self.state {
            TapState::MultiTouch => self.pinch_frame(out),
            TapState::Pressed {
                id,
                start,
                started,
                moved,
                after_tap,
                ..
            } if id == touch.id => {
                let moved = moved || start.distance(touch.position) > self.config.move_slop;
                if moved {
                    self.cancel_timer();
                }
                self.state = TapState::Pressed {
                    id,
                    start,
                    last: touch.position,
                    started,
                    moved,
                    after_tap,
                };
                out.push(GestureOutput::Pointer(PointerEvent::moved(touch.position)));
            }
            _ => {}
        }
    }

    fn pinch_frame(&mut self, out: &mut Vec<GestureOutput>) {
        let Some(mut pinch) = self.pinch else {
            return;
        };
        let (Some(a), Some(b)) = (
            self.touch_position(pinch.touch_a),
            self.touch_position(pinch.touch_b),
        ) else {
            return;
        };

        let distance = a.distance(b);
        let midpoint = a.midpoint(b);

        let delta = midpoint - pinch.last_midpoint;
        if delta.hypot2() > 0.0 {
            out.push(GestureOutput::Pan { delta });
        }
        if pinch.last_distance > f64::EPSILON && distance > f64::EPSILON {
            let factor = distance / pinch.last_distance;
            if (factor - 1.0).abs() > f64::EPSILON {
                out.push(GestureOutput::Zoom {
                    focal: midpoint,
                    factor,
                });
            }
        }

        pinch.last_distance = distance;
        pinch.last_midpoint = midpoint;
        self.pinch = Some(pinch);
    }

    fn touch_end(&mut self, touch: TouchEvent, out: &mut Vec<GestureOutput>) {
        self.touches.retain(|(id, _)| *id != touch.id);

        match self.state {
            TapState::MultiTouch | TapState::LongPressed => {
                if self.touches.is_empty() {
                    self.pinch = None;
                    self.state = TapState::Idle;
                }
            }
            TapState::Pressed {
                id,
                started,
                moved,
                after_tap,
                ..
            } if id == touch.id => {
                self.cancel_timer();
                out.push(GestureOutput::Pointer(PointerEvent::up(touch.position)));

                let quick = touch.time.saturating_sub(started) < self.config.tap_window;
                let is_tap = touch.phase == TouchPhase::End && quick && !moved;
                self.state = TapState::Idle;

                if is_tap && after_tap {
                    log::debug!("gesture: double-tap at {:?}", touch.position);
                    out.push(GestureOutput::DoubleTap {
                        position: touch.position,
                    });
                } else if is_tap {
                    self.state = TapState::PendingTap {
                        position: touch.position,
                    };
                    self.arm(TimerKind::TapExpiry, touch.time + self.config.tap_window);
                }
            }
            _ => {}
        }
    }
}

impl Default for GestureNormalizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
