/*
 * Unit tests for the boundary service
 *
 * The unit tests follows the Arrange, Act, Assert pattern. These tests run
 * the real building threads with a short tick period, so they double as an
 * end-to-end check of the wiring.
 *
 * Tests:
 * - not-initialised and validation errors
 * - status shape after initialisation
 * - live state frames for a serviced car call
 * - reconfiguration resets the world
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod service_tests {
    use crate::api::error::ApiError;
    use crate::api::models::{
        BuildingRequest, CarCallRequest, HallCallRequest, HallDirection,
    };
    use crate::api::service::ElevatorService;
    use crate::config::{CarConfig, DispatchConfig};
    use std::time::{Duration, Instant};

    fn setup_service() -> ElevatorService {
        let car_config = CarConfig {
            tick_ms: 5,
            substeps_per_floor: 5,
            door_open_ticks: 3,
        };
        let mut dispatch_config = DispatchConfig::default();
        dispatch_config.reoptimize_interval_ms = 20;
        ElevatorService::new(car_config, dispatch_config)
    }

    fn initialised_service(total_floors: i32, car_count: usize) -> ElevatorService {
        let service = setup_service();
        service
            .reconfigure_building(&BuildingRequest {
                total_floors,
                car_count,
            })
            .unwrap();
        service
    }

    #[test]
    fn test_uninitialised_service_rejects_operations() {
        // Arrange
        let service = setup_service();

        // Act & Assert
        let hall = service.submit_hall_call(&HallCallRequest {
            floor: 1,
            direction: HallDirection::Up,
        });
        assert_eq!(hall.unwrap_err(), ApiError::NotInitialised);
        assert_eq!(service.get_status().unwrap_err(), ApiError::NotInitialised);
        assert!(service.subscribe().is_err());
    }

    #[test]
    fn test_invalid_building_is_rejected() {
        // Arrange
        let service = setup_service();

        // Act & Assert
        let too_flat = service.reconfigure_building(&BuildingRequest {
            total_floors: 1,
            car_count: 3,
        });
        let no_cars = service.reconfigure_building(&BuildingRequest {
            total_floors: 8,
            car_count: 0,
        });
        assert_eq!(too_flat.unwrap_err(), ApiError::InvalidBuilding);
        assert_eq!(no_cars.unwrap_err(), ApiError::InvalidBuilding);
        assert!(service.get_status().is_err());
    }

    #[test]
    fn test_input_validation() {
        // Arrange
        let service = initialised_service(8, 2);

        // Act & Assert
        let high = service.submit_hall_call(&HallCallRequest {
            floor: 8,
            direction: HallDirection::Up,
        });
        assert_eq!(
            high.unwrap_err(),
            ApiError::FloorOutOfRange {
                floor: 8,
                total_floors: 8
            }
        );

        let negative = service.submit_car_call(&CarCallRequest { car_id: 0, floor: -1 });
        assert!(matches!(
            negative.unwrap_err(),
            ApiError::FloorOutOfRange { .. }
        ));

        let bad_car = service.submit_car_call(&CarCallRequest { car_id: 2, floor: 3 });
        assert_eq!(
            bad_car.unwrap_err(),
            ApiError::CarOutOfRange {
                car_id: 2,
                car_count: 2
            }
        );

        assert!(HallDirection::parse("u").is_ok());
        assert!(HallDirection::parse("X").is_err());
    }

    #[test]
    fn test_status_reflects_initial_building() {
        // Arrange
        let service = initialised_service(8, 3);

        // Act
        let status = service.get_status().unwrap();

        // Assert
        assert_eq!(status.total_floors, 8);
        assert_eq!(status.car_count, 3);
        assert_eq!(status.cars.len(), 3);
        for (car_id, car) in status.cars.iter().enumerate() {
            assert_eq!(car.car_id, car_id);
            assert_eq!(car.current_floor, 0.0);
            assert!(!car.door_open);
        }
    }

    #[test]
    fn test_car_call_is_serviced_end_to_end() {
        // Arrange
        let service = initialised_service(5, 1);
        let frames = service.subscribe().unwrap();

        // Act
        service
            .submit_car_call(&CarCallRequest { car_id: 0, floor: 2 })
            .unwrap();

        // Assert: within the deadline some frame shows the car at floor 2
        // with the door open, and the system then settles back to idle
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut saw_arrival = false;
        while Instant::now() < deadline {
            match frames.recv_timeout(Duration::from_millis(500)) {
                Ok(frame) => {
                    if let Some(car) = frame.cars.first() {
                        if car.current_floor == 2.0 && car.door_open {
                            saw_arrival = true;
                            break;
                        }
                    }
                }
                Err(_) => break,
            }
        }
        assert!(saw_arrival, "car never reported arrival at floor 2");

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = service.get_status().unwrap();
            let car = &status.cars[0];
            if car.current_floor == 2.0 && !car.door_open && car.internal_requests.is_empty() {
                break;
            }
            assert!(Instant::now() < deadline, "car never settled at floor 2");
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_reconfiguration_resets_the_world() {
        // Arrange
        let service = initialised_service(8, 2);
        service
            .submit_car_call(&CarCallRequest { car_id: 0, floor: 7 })
            .unwrap();

        // Act
        service
            .reconfigure_building(&BuildingRequest {
                total_floors: 4,
                car_count: 1,
            })
            .unwrap();

        // Assert: fresh bank, nothing pending
        let status = service.get_status().unwrap();
        assert_eq!(status.total_floors, 4);
        assert_eq!(status.car_count, 1);
        assert_eq!(status.cars[0].current_floor, 0.0);
        assert!(status.cars[0].internal_requests.is_empty());

        // Cleanup
        service.shutdown();
        assert_eq!(service.get_status().unwrap_err(), ApiError::NotInitialised);
    }
}
