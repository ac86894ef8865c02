//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` or update by hand when a migration changes a table.

diesel::table! {
    /// Doctor directory with fee policy.
    doctors (id) {
        /// Primary key.
        id -> Uuid,
        /// Login email; unique.
        email -> Text,
        /// Credential hash; never read by this service.
        password_hash -> Text,
        /// Display name.
        name -> Text,
        /// Medical specialty.
        specialization -> Text,
        /// Consultation fee in minor units.
        fee_amount -> Int8,
        /// ISO 4217 code of the fee.
        fee_currency -> Text,
        /// First-visit discount percentage (0-100), when offered.
        discount_percentage -> Nullable<Int2>,
        /// First-visit discount cap in minor units, when offered.
        discount_max_amount -> Nullable<Int8>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient accounts and wallets.
    patients (id) {
        /// Primary key.
        id -> Uuid,
        /// Login email; unique.
        email -> Text,
        /// Credential hash; never read by this service.
        password_hash -> Text,
        /// Display name.
        name -> Text,
        /// Optional date of birth.
        date_of_birth -> Nullable<Date>,
        /// Optional contact number.
        phone -> Nullable<Text>,
        /// Wallet balance in minor units; constrained non-negative.
        wallet_balance -> Int8,
        /// ISO 4217 code of the wallet.
        wallet_currency -> Text,
        /// Doctors this patient has booked before.
        appointed_doctors -> Array<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Booked consultations.
    ///
    /// The partial unique index `appointments_active_slot_key` permits one
    /// non-cancelled row per doctor, date and slot.
    appointments (id) {
        /// Primary key.
        id -> Uuid,
        /// Consulting doctor.
        doctor_id -> Uuid,
        /// Booking patient.
        patient_id -> Uuid,
        /// Consultation date.
        appointment_date -> Date,
        /// Slot start.
        start_time -> Time,
        /// Slot end.
        end_time -> Time,
        /// `scheduled`, `completed` or `cancelled`.
        status -> Text,
        /// Fee before discount in minor units.
        original_amount -> Int8,
        /// Discount in minor units.
        discount_applied -> Int8,
        /// Amount charged in minor units.
        final_amount -> Int8,
        /// ISO 4217 code of the amounts.
        currency -> Text,
        /// First booking between this patient and doctor.
        is_first_consultation -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Money movements.
    transactions (id) {
        /// Primary key.
        id -> Uuid,
        /// Paying patient.
        patient_id -> Uuid,
        /// Paid doctor, for booking payments.
        doctor_id -> Nullable<Uuid>,
        /// Settled appointment, for booking payments.
        appointment_id -> Nullable<Uuid>,
        /// `appointment_payment`, `wallet_credit` or `wallet_debit`.
        kind -> Text,
        /// Amount in minor units.
        amount -> Int8,
        /// ISO 4217 code of the amount.
        currency -> Text,
        /// `pending`, `completed`, `failed` or `refunded`.
        status -> Text,
        /// Free-form context.
        metadata -> Jsonb,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of issued bearer tokens.
    access_tokens (token_hash) {
        /// Digest of the raw token.
        token_hash -> Bytea,
        /// Patient or doctor identifier.
        principal_id -> Uuid,
        /// `patient` or `doctor`.
        role -> Text,
        /// Expiry instant.
        expires_at -> Timestamptz,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Booking receipts keyed by client idempotency key.
    idempotency_keys (key, patient_id) {
        /// Client-supplied key.
        key -> Uuid,
        /// Owning patient.
        patient_id -> Uuid,
        /// SHA-256 of the canonical request payload.
        payload_hash -> Bytea,
        /// Serialised booking receipt.
        response_snapshot -> Jsonb,
        /// Commit timestamp; drives expiry.
        created_at -> Timestamptz,
    }
}
