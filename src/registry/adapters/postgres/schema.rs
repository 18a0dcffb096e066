//! Diesel schema for registry persistence.

diesel::table! {
    /// Endpoint records.
    endpoints (id) {
        /// Endpoint identifier.
        id -> Uuid,
        /// Endpoint name.
        #[max_length = 128]
        name -> Varchar,
        /// Owner name.
        #[max_length = 128]
        owner -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Algorithm version records.
    ml_algorithms (id) {
        /// Algorithm identifier.
        id -> Uuid,
        /// Algorithm name.
        #[max_length = 128]
        name -> Varchar,
        /// Description.
        #[max_length = 1000]
        description -> Varchar,
        /// Opaque source text.
        #[max_length = 50000]
        code -> Varchar,
        /// Version label.
        #[max_length = 128]
        version -> Varchar,
        /// Owner name.
        #[max_length = 128]
        owner -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Owning endpoint.
        parent_endpoint_id -> Uuid,
    }
}

diesel::table! {
    /// Algorithm status observations.
    ml_algorithm_statuses (id) {
        /// Status identifier.
        id -> Uuid,
        /// Free-text status label.
        #[max_length = 128]
        status -> Varchar,
        /// Whether this is the effective status.
        active -> Bool,
        /// Author name.
        #[max_length = 128]
        created_by -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Owning algorithm.
        parent_mlalgorithm_id -> Uuid,
    }
}

diesel::table! {
    /// Inference request audit records.
    ml_requests (id) {
        /// Request identifier.
        id -> Uuid,
        /// Input payload.
        #[max_length = 10000]
        input_data -> Varchar,
        /// Full algorithm output.
        #[max_length = 10000]
        full_response -> Varchar,
        /// Caller-facing response.
        #[max_length = 10000]
        response -> Varchar,
        /// Optional feedback payload.
        #[max_length = 10000]
        feedback -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Owning algorithm.
        parent_mlalgorithm_id -> Uuid,
    }
}

diesel::joinable!(ml_algorithms -> endpoints (parent_endpoint_id));
diesel::joinable!(ml_algorithm_statuses -> ml_algorithms (parent_mlalgorithm_id));
diesel::joinable!(ml_requests -> ml_algorithms (parent_mlalgorithm_id));

diesel::allow_tables_to_appear_in_same_query!(
    endpoints,
    ml_algorithms,
    ml_algorithm_statuses,
    ml_requests,
);
