//! Where a selected candidate goes
//!
//! The location card and header search move the session location; the
//! publish form only fills its own fields. Both are selection targets.

use crate::context::LocationContext;
use crate::error::Result;
use crate::place::Place;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Receiver of a user's (or auto-) selected place
pub trait SelectionTarget: Send + Sync {
    fn commit(&self, place: Place) -> Result<()>;
}

impl SelectionTarget for LocationContext {
    fn commit(&self, place: Place) -> Result<()> {
        self.set_place(place)
    }
}

impl<T: SelectionTarget + ?Sized> SelectionTarget for Arc<T> {
    fn commit(&self, place: Place) -> Result<()> {
        (**self).commit(place)
    }
}

/// Location fields of a listing being published
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Form-local location, pre-filled from the session place
#[derive(Debug, Default)]
pub struct FormLocation {
    fields: Mutex<FormFields>,
}

impl FormLocation {
    /// Pre-fill from the current session place, if any
    pub fn from_place(place: Option<&Place>) -> Self {
        let fields = place
            .map(|p| FormFields {
                city: p.city.clone(),
                state: p.state.clone(),
                postal_code: p.postal_code.clone(),
            })
            .unwrap_or_default();
        Self {
            fields: Mutex::new(fields),
        }
    }

    /// Current field values
    pub fn fields(&self) -> FormFields {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SelectionTarget for FormLocation {
    /// A region-level candidate keeps the postal code already in the form
    fn commit(&self, place: Place) -> Result<()> {
        let mut fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        if place.exact_postal_code().is_some() {
            fields.postal_code = place.postal_code;
        }
        fields.city = place.city;
        fields.state = place.state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocationCache;

    #[test]
    fn test_form_prefill() {
        let guaira = Place::new("Guaíra", "SP", Some("14790-000"), None);
        let form = FormLocation::from_place(Some(&guaira));
        assert_eq!(form.fields().city, "Guaíra");
        assert_eq!(form.fields().postal_code, "14790-000");

        assert_eq!(FormLocation::from_place(None).fields(), FormFields::default());
    }

    #[test]
    fn test_form_keeps_postal_code_for_region() {
        let guaira = Place::new("Guaíra", "SP", Some("14790-000"), None);
        let form = FormLocation::from_place(Some(&guaira));

        form.commit(Place::new("Barretos", "SP", None, None)).unwrap();
        let fields = form.fields();
        assert_eq!(fields.city, "Barretos");
        assert_eq!(fields.postal_code, "14790-000");

        form.commit(Place::new("Barretos", "SP", Some("14780000"), None)).unwrap();
        assert_eq!(form.fields().postal_code, "14780-000");
    }

    #[test]
    fn test_context_target() {
        let ctx = Arc::new(LocationContext::new(LocationCache::without_storage()));
        let barretos = Place::new("Barretos", "SP", Some("14780000"), None);

        ctx.commit(barretos.clone()).unwrap();
        assert_eq!(ctx.place(), Some(barretos));
    }
}
