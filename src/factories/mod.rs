pub mod connector_factory;
