use std::time::{Duration, Instant};

pub const SHOW_DELAY: Duration = Duration::from_millis(400);
pub const HIDE_DELAY: Duration = Duration::from_millis(150);
pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub show: Duration,
    pub hide: Duration,
    pub fade: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            show: SHOW_DELAY,
            hide: HIDE_DELAY,
            fade: FADE_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    PendingShow(Instant),
    Visible,
    PendingHide(Instant),
    FadingOut(Instant),
}

/// Hover preview timers. A hover cancels a pending hide and a leave cancels
/// a pending show; only one deadline is ever armed.
#[derive(Debug, Clone)]
pub struct PreviewTimer<T> {
    delays: Delays,
    phase: Phase,
    target: Option<T>,
}

impl<T: Clone + PartialEq> PreviewTimer<T> {
    pub fn new(delays: Delays) -> Self {
        Self {
            delays,
            phase: Phase::Hidden,
            target: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn is_rendered(&self) -> bool {
        matches!(
            self.phase,
            Phase::Visible | Phase::PendingHide(_) | Phase::FadingOut(_)
        )
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.phase, Phase::FadingOut(_))
    }

    pub fn hover(&mut self, target: T, now: Instant) {
        match self.phase {
            Phase::Visible | Phase::PendingHide(_) => {
                self.phase = Phase::Visible;
            }
            Phase::PendingShow(deadline) if self.target.as_ref() == Some(&target) => {
                self.phase = Phase::PendingShow(deadline);
            }
            Phase::Hidden | Phase::PendingShow(_) | Phase::FadingOut(_) => {
                self.phase = Phase::PendingShow(now + self.delays.show);
            }
        }
        self.target = Some(target);
    }

    pub fn leave(&mut self, now: Instant) {
        match self.phase {
            Phase::PendingShow(_) => {
                self.phase = Phase::Hidden;
                self.target = None;
            }
            Phase::Visible => {
                self.phase = Phase::PendingHide(now + self.delays.hide);
            }
            Phase::Hidden | Phase::PendingHide(_) | Phase::FadingOut(_) => {}
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let next = match self.phase {
            Phase::PendingShow(deadline) if now >= deadline => Phase::Visible,
            Phase::PendingHide(deadline) if now >= deadline => {
                Phase::FadingOut(now + self.delays.fade)
            }
            Phase::FadingOut(deadline) if now >= deadline => Phase::Hidden,
            _ => return false,
        };
        if next == Phase::Hidden {
            self.target = None;
        }
        self.phase = next;
        true
    }

    pub fn dismiss(&mut self) {
        self.phase = Phase::Hidden;
        self.target = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::PendingShow(at) | Phase::PendingHide(at) | Phase::FadingOut(at) => Some(at),
            Phase::Hidden | Phase::Visible => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn shows_after_delay() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover(1, start);
        assert!(!timer.tick(start + ms(399)));
        assert!(!timer.is_rendered());
        assert!(timer.tick(start + ms(400)));
        assert_eq!(timer.phase(), Phase::Visible);
        assert_eq!(timer.target(), Some(&1));
    }

    #[test]
    fn leave_cancels_pending_show() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover(1, start);
        timer.leave(start + ms(100));
        assert_eq!(timer.phase(), Phase::Hidden);
        assert!(!timer.tick(start + ms(1000)));
        assert!(!timer.is_rendered());
    }

    #[test]
    fn hover_cancels_pending_hide() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover(1, start);
        timer.tick(start + ms(400));
        timer.leave(start + ms(500));
        timer.hover(2, start + ms(600));
        assert_eq!(timer.phase(), Phase::Visible);
        assert_eq!(timer.target(), Some(&2));
        assert!(!timer.tick(start + ms(2000)));
    }

    #[test]
    fn hides_then_fades_out() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover(1, start);
        timer.tick(start + ms(400));
        timer.leave(start + ms(1000));
        assert!(timer.is_rendered());
        assert!(timer.tick(start + ms(1150)));
        assert!(timer.is_fading());
        assert!(!timer.tick(start + ms(1449)));
        assert!(timer.tick(start + ms(1450)));
        assert_eq!(timer.phase(), Phase::Hidden);
        assert_eq!(timer.target(), None);
    }

    #[test]
    fn hover_during_fade_rearms_show() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover(1, start);
        timer.tick(start + ms(400));
        timer.leave(start + ms(400));
        timer.tick(start + ms(550));
        timer.hover(1, start + ms(600));
        assert_eq!(timer.phase(), Phase::PendingShow(start + ms(1000)));
    }

    #[test]
    fn dismiss_is_immediate() {
        let start = Instant::now();
        let mut timer = PreviewTimer::new(Delays::default());
        timer.hover("a", start);
        timer.tick(start + ms(400));
        timer.dismiss();
        assert_eq!(timer.phase(), Phase::Hidden);
        assert_eq!(timer.deadline(), None);
    }
}
