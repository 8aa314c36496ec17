// handlers/mod.rs - two security tiers
//
// public:    no session required (/api/auth/register, /api/auth/login)
// protected: session token plus a live user row (everything else under /api)

pub mod protected;
pub mod public;
