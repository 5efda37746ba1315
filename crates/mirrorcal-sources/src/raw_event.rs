//! Raw event handles as handed over by a calendar source.
//!
//! A [`RawEvent`] is opaque to the engine: it may carry serialized iCalendar
//! text, a reference to fetch it from, an already-parsed component, or a mix.
//! The adapter decides which of them to use.

use icalendar::Event;

/// Where to find an event when no usable inline data is present.
#[derive(Debug, Clone)]
pub enum EventReference {
    /// A URL (or other fetchable locator) returning iCalendar text.
    Locator(String),
    /// An already-parsed `VEVENT` component.
    Component(Box<Event>),
}

/// One event as delivered by a calendar source.
#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    /// Serialized iCalendar data, tried first.
    pub data: Option<String>,
    /// Fallback used when `data` is absent or unparsable.
    pub reference: Option<EventReference>,
}

impl RawEvent {
    /// A raw event carrying serialized iCalendar data.
    pub fn inline(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            reference: None,
        }
    }

    /// A raw event that must be fetched from `locator`.
    pub fn locator(locator: impl Into<String>) -> Self {
        Self {
            data: None,
            reference: Some(EventReference::Locator(locator.into())),
        }
    }

    /// A raw event wrapping an already-parsed component.
    pub fn component(event: Event) -> Self {
        Self {
            data: None,
            reference: Some(EventReference::Component(Box::new(event))),
        }
    }

    /// Builder method to attach a fallback reference.
    pub fn with_reference(mut self, reference: EventReference) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Returns the locator, if this event is fetched by reference.
    pub fn locator_str(&self) -> Option<&str> {
        match self.reference {
            Some(EventReference::Locator(ref locator)) => Some(locator),
            _ => None,
        }
    }

    /// Returns true if there is nothing to parse at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.reference.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalendar::Component;

    #[test]
    fn constructors() {
        let raw = RawEvent::inline("BEGIN:VCALENDAR\r\nEND:VCALENDAR");
        assert!(raw.data.is_some());
        assert!(raw.reference.is_none());

        let raw = RawEvent::locator("https://cal.example.com/a.ics");
        assert_eq!(raw.locator_str(), Some("https://cal.example.com/a.ics"));

        let raw = RawEvent::component(Event::new().summary("Lunch").done());
        assert!(matches!(raw.reference, Some(EventReference::Component(_))));
        assert!(raw.locator_str().is_none());
    }

    #[test]
    fn empty_event() {
        assert!(RawEvent::default().is_empty());
        let raw = RawEvent::inline("x").with_reference(EventReference::Locator("y".into()));
        assert!(!raw.is_empty());
        assert_eq!(raw.locator_str(), Some("y"));
    }
}
