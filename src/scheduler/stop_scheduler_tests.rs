/*
 * Unit tests for the stop scheduler
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - classification of hall calls against each effective direction
 * - LOOK selection order, tie-breaks and the apex turnaround
 * - peek/pop symmetry and direction-flip commitment
 * - removal by request identity
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod stop_scheduler_tests {
    use crate::scheduler::stop_scheduler::{Classified, StopClass, StopScheduler};
    use crate::shared::Direction::{Down, Idle, Up};
    use crate::shared::{Direction, Position, RequestId};

    const SCALE: i32 = 5;

    fn at(floor: i32) -> Position {
        Position::at_floor(floor, SCALE)
    }

    /// A position strictly between `floor` and `floor + 1`.
    fn between(floor: i32) -> Position {
        let mut position = Position::at_floor(floor, SCALE);
        position.advance(Direction::Up);
        position.advance(Direction::Up);
        position
    }

    #[test]
    fn test_classify_idle() {
        // Arrange
        let mut scheduler = StopScheduler::new();

        // Act
        scheduler.add_hall_call(at(3), Idle, 6, Up, RequestId::next());
        scheduler.add_hall_call(at(3), Idle, 7, Down, RequestId::next());
        scheduler.add_hall_call(at(3), Idle, 1, Down, RequestId::next());
        scheduler.add_hall_call(at(3), Idle, 0, Up, RequestId::next());
        let same_floor = scheduler.add_hall_call(at(3), Idle, 3, Up, RequestId::next());

        // Assert
        assert!(scheduler.test_up_up().contains(6));
        assert!(scheduler.test_up_down().contains(7));
        assert!(scheduler.test_down_down().contains(1));
        assert!(scheduler.test_down_up().contains(0));
        assert_eq!(same_floor, Classified::AtFloor);
    }

    #[test]
    fn test_classify_moving_up() {
        // Arrange
        let mut scheduler = StopScheduler::new();

        // Act: car between floors 3 and 4, travelling up
        scheduler.add_hall_call(between(3), Up, 5, Up, RequestId::next());
        scheduler.add_hall_call(between(3), Up, 5, Down, RequestId::next());
        scheduler.add_hall_call(between(3), Up, 3, Up, RequestId::next());
        scheduler.add_hall_call(between(3), Up, 2, Down, RequestId::next());

        // Assert: floors already passed are missed regardless of direction
        assert!(scheduler.test_up_up().contains(5));
        assert!(scheduler.test_up_down().contains(5));
        assert!(scheduler.test_down_up().contains(3));
        assert!(scheduler.test_down_up().contains(2));
    }

    #[test]
    fn test_classify_moving_down() {
        // Arrange
        let mut scheduler = StopScheduler::new();

        // Act
        scheduler.add_hall_call(at(5), Down, 2, Down, RequestId::next());
        scheduler.add_hall_call(at(5), Down, 2, Up, RequestId::next());
        scheduler.add_hall_call(at(5), Down, 7, Up, RequestId::next());

        // Assert
        assert!(scheduler.test_down_down().contains(2));
        assert!(scheduler.test_down_up().contains(2));
        assert!(scheduler.test_up_down().contains(7));
    }

    #[test]
    fn test_car_call_classification() {
        // Arrange
        let mut scheduler = StopScheduler::new();

        // Act
        scheduler.add_car_call(at(3), 6, RequestId::next());
        scheduler.add_car_call(at(3), 1, RequestId::next());
        let here = scheduler.add_car_call(at(3), 3, RequestId::next());

        // Assert
        assert!(scheduler.test_internal_up().contains(6));
        assert!(scheduler.test_internal_down().contains(1));
        assert_eq!(here, Classified::AtFloor);
    }

    #[test]
    fn test_pop_serves_nearest_up_stop_first() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        scheduler.add_car_call(at(0), 6, RequestId::next());
        scheduler.add_hall_call(at(0), Up, 4, Up, RequestId::next());

        // Act
        let mut direction = Up;
        let first = scheduler.pop_next(at(0), &mut direction).unwrap();
        let second = scheduler.pop_next(at(4), &mut direction).unwrap();

        // Assert
        assert_eq!(first.floor, 4);
        assert_eq!(first.class, StopClass::HallUp);
        assert_eq!(second.floor, 6);
        assert_eq!(second.class, StopClass::Internal);
    }

    #[test]
    fn test_same_floor_tie_prefers_internal() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(at(0), Up, 5, Up, RequestId::next());
        scheduler.add_car_call(at(0), 5, RequestId::next());

        // Act
        let mut direction = Up;
        let first = scheduler.pop_next(at(0), &mut direction).unwrap();
        let second = scheduler.pop_next(at(0), &mut direction).unwrap();

        // Assert
        assert_eq!(first.class, StopClass::Internal);
        assert_eq!(second.class, StopClass::HallUp);
        assert_eq!(first.floor, 5);
        assert_eq!(second.floor, 5);
    }

    #[test]
    fn test_missed_stop_only_considered_above_car() {
        // Arrange: an up-wanting call the car has already passed
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(between(3), Up, 2, Up, RequestId::next());
        scheduler.add_hall_call(between(3), Up, 6, Up, RequestId::next());

        // Act
        let mut direction = Up;
        let first = scheduler.pop_next(between(3), &mut direction).unwrap();

        // Assert: the missed floor 2 must wait for the return sweep
        assert_eq!(first.floor, 6);
        let second = scheduler.pop_next(at(6), &mut direction).unwrap();
        assert_eq!(second.floor, 2);
        assert_eq!(second.direction, Up);
        assert_eq!(direction, Down);
    }

    #[test]
    fn test_apex_turnaround_pops_highest_down_call() {
        // Arrange: car going up with two down-wanting passengers above
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(at(2), Up, 5, Down, RequestId::next());
        scheduler.add_hall_call(at(2), Up, 7, Down, RequestId::next());

        // Act
        let mut direction = Up;
        let apex = scheduler.pop_next(at(2), &mut direction).unwrap();

        // Assert: ride to the top of the sweep, service as a DOWN request
        assert_eq!(apex.floor, 7);
        assert_eq!(apex.direction, Down);
        assert_eq!(apex.class, StopClass::HallDown);
        // Direction is untouched by the apex pop itself
        assert_eq!(direction, Up);

        let next = scheduler.pop_next(at(7), &mut direction).unwrap();
        assert_eq!(next.floor, 5);
        assert_eq!(next.direction, Down);
    }

    #[test]
    fn test_pop_flips_direction_when_sweep_exhausted() {
        // Arrange: an up-wanting call left behind below the car
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(at(5), Up, 2, Up, RequestId::next());

        // Act: nothing left on the up side
        let mut direction = Up;
        let stop = scheduler.pop_next(at(5), &mut direction).unwrap();

        // Assert: serviced in its original direction on the return sweep
        assert_eq!(stop.floor, 2);
        assert_eq!(stop.direction, Up);
        assert_eq!(direction, Down);
    }

    #[test]
    fn test_peek_does_not_mutate() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(at(5), Up, 2, Up, RequestId::next());

        // Act: peeking across a flip must not commit the flip or consume
        let peeked = scheduler.peek_next(at(5), Up);

        // Assert
        assert_eq!(peeked, Some((2, Up)));
        assert!(scheduler.test_down_up().contains(2));
        let mut direction = Up;
        assert!(scheduler.pop_next(at(5), &mut direction).is_some());
    }

    #[test]
    fn test_idle_with_only_car_calls_still_moves() {
        // Arrange: leftover car call with the car idle (e.g. queued during a
        // door cycle on the way down)
        let mut scheduler = StopScheduler::new();
        scheduler.add_car_call(at(2), 6, RequestId::next());

        // Act
        let mut direction = Idle;
        let stop = scheduler.pop_next(at(2), &mut direction).unwrap();

        // Assert
        assert_eq!(stop.floor, 6);
        assert_eq!(stop.class, StopClass::Internal);
        assert_eq!(direction, Up);
    }

    #[test]
    fn test_idle_prefers_external_classes() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        scheduler.add_hall_call(at(3), Idle, 6, Up, RequestId::next());
        scheduler.add_hall_call(at(3), Idle, 1, Down, RequestId::next());

        // Act
        let mut direction = Idle;
        let stop = scheduler.pop_next(at(3), &mut direction).unwrap();

        // Assert: up_up is the first class checked from idle
        assert_eq!(stop.floor, 6);
        assert_eq!(stop.direction, Up);
    }

    #[test]
    fn test_remove_by_id_reports_nominal_direction() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        let up_id = RequestId::next();
        let apex_id = RequestId::next();
        scheduler.add_hall_call(at(0), Up, 4, Up, up_id);
        scheduler.add_hall_call(at(0), Up, 6, Down, apex_id);

        // Act
        let removed_up = scheduler.remove_by_id(up_id);
        let removed_apex = scheduler.remove_by_id(apex_id);
        let missing = scheduler.remove_by_id(RequestId::next());

        // Assert: the apex call reports DOWN even though the car travels up
        assert_eq!(removed_up, Some((4, Up)));
        assert_eq!(removed_apex, Some((6, Down)));
        assert_eq!(missing, None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_range_counts_for_cost_scoring() {
        // Arrange
        let mut scheduler = StopScheduler::new();
        scheduler.add_car_call(at(0), 2, RequestId::next());
        scheduler.add_hall_call(at(0), Up, 4, Up, RequestId::next());
        scheduler.add_hall_call(at(0), Up, 9, Down, RequestId::next());

        // Act & Assert
        assert_eq!(scheduler.count_up_serving_in(0, 5), 2);
        assert_eq!(scheduler.count_up_serving_in(3, 5), 1);
        assert_eq!(scheduler.total_stops(), 3);
        assert_eq!(scheduler.lowest_stop(), Some(2));
        assert_eq!(scheduler.highest_stop(), Some(9));
    }
}
