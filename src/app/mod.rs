pub mod certification_service;
