//! Scheduling service: conflict-checked booking and calendar reads.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::appointment::{
    free_ranges, Appointment, AppointmentStatus, AvailabilitySlot, TimeRange,
};
use crate::domain::ports::{
    AppointmentCommand, AppointmentPayload, AppointmentQuery, AppointmentRepository,
    AppointmentRepositoryError, AvailabilityRepository, AvailabilityRepositoryError,
    BookAppointmentRequest, CalendarWindowRequest, CancelAppointmentRequest,
    ListAppointmentsRequest, NewAppointment, RangePayload, ReplaceAvailabilityRequest,
    RescheduleAppointmentRequest,
};
use crate::domain::user::UserId;
use crate::domain::Error;

/// [`AppointmentCommand`] and [`AppointmentQuery`] over the scheduling
/// repositories.
pub struct AppointmentService<A, V> {
    appointments: Arc<A>,
    availability: Arc<V>,
}

impl<A, V> AppointmentService<A, V> {
    pub fn new(appointments: Arc<A>, availability: Arc<V>) -> Self {
        Self {
            appointments,
            availability,
        }
    }
}

fn map_appointment_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::NotFound => Error::not_found("appointment not found"),
        AppointmentRepositoryError::Overlap => {
            Error::conflict("the requested time overlaps an existing appointment")
        }
        other => Error::internal(other.to_string()),
    }
}

fn map_availability_error(error: AvailabilityRepositoryError) -> Error {
    Error::internal(error.to_string())
}

impl<A, V> AppointmentService<A, V>
where
    A: AppointmentRepository,
    V: AvailabilityRepository,
{
    async fn load_for(&self, appointment_id: &Uuid, actor: &UserId) -> Result<Appointment, Error> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await
            .map_err(map_appointment_error)?
            .ok_or_else(|| Error::not_found("appointment not found"))?;
        if !appointment.is_party(actor) {
            return Err(Error::forbidden("not a party to this appointment"));
        }
        Ok(appointment)
    }

    /// The requested range must sit inside one expansion of the lawyer's
    /// declared availability.
    async fn check_availability(
        &self,
        lawyer_id: &UserId,
        range: &TimeRange,
    ) -> Result<(), Error> {
        let slots = self
            .availability
            .list_for_lawyer(lawyer_id)
            .await
            .map_err(map_availability_error)?;
        let covered = slots
            .iter()
            .flat_map(|slot| slot.expand(range))
            .any(|expanded| expanded.contains(range));
        if covered {
            Ok(())
        } else {
            Err(Error::invalid_request(
                "the requested time is outside the lawyer's availability",
            ))
        }
    }
}

#[async_trait]
impl<A, V> AppointmentCommand for AppointmentService<A, V>
where
    A: AppointmentRepository,
    V: AvailabilityRepository,
{
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error> {
        let range = TimeRange::new(request.starts_at, request.ends_at)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.check_availability(&request.lawyer_id, &range).await?;
        let booked = self
            .appointments
            .book_if_free(NewAppointment {
                id: Uuid::new_v4(),
                client_id: request.client_id,
                lawyer_id: request.lawyer_id,
                range,
            })
            .await
            .map_err(map_appointment_error)?;
        Ok(booked.into())
    }

    async fn cancel(
        &self,
        request: CancelAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        let appointment = self.load_for(&request.appointment_id, &request.actor).await?;
        if appointment.status != AppointmentStatus::Scheduled {
            return Err(Error::conflict("only scheduled appointments can be cancelled"));
        }
        let cancelled = self
            .appointments
            .set_status(&appointment.id, AppointmentStatus::Cancelled)
            .await
            .map_err(map_appointment_error)?;
        Ok(cancelled.into())
    }

    async fn reschedule(
        &self,
        request: RescheduleAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        let appointment = self.load_for(&request.appointment_id, &request.actor).await?;
        if appointment.status != AppointmentStatus::Scheduled {
            return Err(Error::conflict(
                "only scheduled appointments can be rescheduled",
            ));
        }
        let range = TimeRange::new(request.starts_at, request.ends_at)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.check_availability(&appointment.lawyer_id, &range).await?;
        let moved = self
            .appointments
            .reschedule_if_free(&appointment.id, range)
            .await
            .map_err(map_appointment_error)?;
        Ok(moved.into())
    }

    async fn replace_availability(
        &self,
        request: ReplaceAvailabilityRequest,
    ) -> Result<(), Error> {
        let slots = request
            .slots
            .into_iter()
            .map(AvailabilitySlot::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.availability
            .replace_for_lawyer(&request.lawyer_id, slots)
            .await
            .map_err(map_availability_error)
    }
}

#[async_trait]
impl<A, V> AppointmentQuery for AppointmentService<A, V>
where
    A: AppointmentRepository,
    V: AvailabilityRepository,
{
    async fn list_appointments(
        &self,
        request: ListAppointmentsRequest,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        let appointments = self
            .appointments
            .list_for_user(&request.actor)
            .await
            .map_err(map_appointment_error)?;
        Ok(appointments.into_iter().map(Into::into).collect())
    }

    async fn busy(&self, request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error> {
        let window = TimeRange::window(request.from, request.to)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let ranges = self
            .appointments
            .booked_ranges(&request.lawyer_id, &window)
            .await
            .map_err(map_appointment_error)?;
        Ok(ranges.into_iter().map(Into::into).collect())
    }

    async fn slots(&self, request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error> {
        let window = TimeRange::window(request.from, request.to)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let declared = self
            .availability
            .list_for_lawyer(&request.lawyer_id)
            .await
            .map_err(map_availability_error)?;
        let busy = self
            .appointments
            .booked_ranges(&request.lawyer_id, &window)
            .await
            .map_err(map_appointment_error)?;
        Ok(free_ranges(&declared, &busy, &window)
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
