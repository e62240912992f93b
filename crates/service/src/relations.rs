//! Relationship resolver.
//!
//! Parent/child lists are O(n) scans of the dependent type filtered by foreign key. Place to
//! Amenity goes through [`Session::amenities_of`], which the relational backend answers from the
//! join table and the file backend from the place's inline id set.

use models::{Amenity, City, Place, Resource, Review, State};

use crate::errors::ServiceError;
use crate::resources::{get, list_where, sort_by_age};
use crate::storage::Session;

pub async fn place_amenities(s: &mut dyn Session, place_id: &str) -> Result<Vec<Amenity>, ServiceError> {
    let place = get::<Place>(s, place_id).await?;
    let mut amenities = s.amenities_of(&place).await?;
    sort_by_age(&mut amenities);
    Ok(amenities)
}

pub async fn place_reviews(s: &mut dyn Session, place_id: &str) -> Result<Vec<Review>, ServiceError> {
    get::<Place>(s, place_id).await?;
    list_where::<Review, _>(s, |r| r.place_id == place_id).await
}

pub async fn state_cities(s: &mut dyn Session, state_id: &str) -> Result<Vec<City>, ServiceError> {
    get::<State>(s, state_id).await?;
    list_where::<City, _>(s, |c| c.state_id == state_id).await
}

pub async fn city_places(s: &mut dyn Session, city_id: &str) -> Result<Vec<Place>, ServiceError> {
    get::<City>(s, city_id).await?;
    list_where::<Place, _>(s, |p| p.city_id == city_id).await
}

/// Link an amenity to a place.
///
/// Returns the amenity and whether a new link was made; linking twice is a no-op.
pub async fn link_amenity(s: &mut dyn Session, place_id: &str, amenity_id: &str) -> Result<(Amenity, bool), ServiceError> {
    let mut place = get::<Place>(s, place_id).await?;
    let amenity = get::<Amenity>(s, amenity_id).await?;
    if place.amenity_ids.contains(amenity_id) {
        return Ok((amenity, false));
    }
    place.amenity_ids.insert(amenity_id);
    place.touch();
    s.new(place.into()).await?;
    s.save().await?;
    tracing::info!(event = "amenity_linked", place_id, amenity_id);
    Ok((amenity, true))
}

/// Remove a link; a link that does not exist is not-found like an unknown id.
pub async fn unlink_amenity(s: &mut dyn Session, place_id: &str, amenity_id: &str) -> Result<(), ServiceError> {
    let mut place = get::<Place>(s, place_id).await?;
    get::<Amenity>(s, amenity_id).await?;
    if !place.amenity_ids.remove(amenity_id) {
        return Err(ServiceError::not_found("amenity link"));
    }
    place.touch();
    s.new(place.into()).await?;
    s.save().await?;
    tracing::info!(event = "amenity_unlinked", place_id, amenity_id);
    Ok(())
}
